//! Terminal view of the aggregation run.
//!
//! Writes to stderr so it can be enabled alongside the JSON broadcast
//! stream on stdout without corrupting it.

use linkgauge_core::{DqiEstimator, Message, ProfileRegistry};

/// Print one inbound message as it is processed.
pub fn observe(message: &Message) {
    match message {
        Message::Reading(r) if r.is_self_estimate() => {
            eprintln!("node {:>3}  self-estimate echo", r.node);
        }
        Message::Reading(r) => {
            let tag = if r.priority { "priority" } else { "        " };
            eprintln!(
                "node {:>3}  reading msg {:>5}  {} pairs  {}",
                r.node,
                r.msg_id,
                r.values.len(),
                tag
            );
        }
        Message::QualityReport(q) => {
            eprintln!(
                "node {:>3}  quality report msg {:>5}  ticks {}..={}",
                q.node, q.msg_id, q.start_tick, q.end_tick
            );
        }
        Message::Ack(a) => {
            eprintln!("node {:>3}  inbound ack msg {:>5}", a.node, a.msg_id);
        }
        Message::Feedback(f) => {
            eprintln!("node {:>3}  stray inbound feedback", f.node);
        }
    }
}

/// Print the final per-node quality table.
pub fn summary(registry: &ProfileRegistry) {
    let estimator = DqiEstimator::default();

    eprintln!();
    eprintln!("node  received  gaps    priority  windows  dqi     drop");
    for profile in registry.iter() {
        let est = estimator.estimate(profile);
        eprintln!(
            "{:>4}  {:>8}  {:>6}  {:>8}  {:>7}  {:.4}  {:.4}",
            profile.id(),
            profile.received_count(),
            profile.gap_count(),
            profile.priority_received_count(),
            profile.window_index(),
            est.dqi,
            est.drop_rate
        );
    }
}
