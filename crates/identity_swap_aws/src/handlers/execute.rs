use identity_swap_core::{Color, Result, SwapError, SwapJournal};

use crate::adapters::journal_store::JournalStore;
use crate::adapters::operator::Operator;
use crate::adapters::platform::OrchestrationPlatform;

pub const CONVERGENCE_NOTICE: &str =
    "All updates were accepted. ECS rolls them out asynchronously; the swap should be visible within a few minutes.";

/// Issues one update per pending journal step, in plan order.
///
/// The journal is rewritten after every accepted update and removed once all
/// steps are complete. A rejected update stops the run; steps already applied
/// stay applied and remain marked in the journal.
pub fn execute_journal(
    platform: &impl OrchestrationPlatform,
    journal: &mut SwapJournal,
    journal_store: &impl JournalStore,
    journal_key: &str,
    operator: &mut impl Operator,
) -> Result<usize> {
    let total = journal.total_steps();
    let mut applied = 0usize;

    for index in journal.pending_indices() {
        let step = &journal.steps[index];
        let cluster = match step.service.color {
            Color::Blue => journal.blue_cluster.clone(),
            Color::Green => journal.green_cluster.clone(),
        };

        tracing::info!(
            step = index + 1,
            total,
            cluster = %cluster,
            service = %step.service,
            target = %step.target,
            "requesting service update"
        );

        if let Err(message) = platform.update_service(&cluster, &step.service.service, &step.target) {
            tracing::error!(step = index + 1, total, service = %step.service, %message, "service update rejected");
            return Err(SwapError::Execution {
                step: index + 1,
                total,
                service: step.service.to_string(),
                message,
            });
        }

        journal.mark_completed(index)?;
        journal_store.save(journal_key, journal)?;
        applied += 1;
    }

    journal_store.remove(journal_key)?;
    operator.show(CONVERGENCE_NOTICE)?;
    Ok(applied)
}
