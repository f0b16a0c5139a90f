//! Interactive selection over candidate batches.
//!
//! Each round shows one batch plus a "More options" choice. Asking for more
//! replaces the batch wholesale with a freshly generated one; batches are never
//! merged. The loop ends on a pick, a dismissal, or an empty regenerated batch.

use crate::host::Interaction;
use crate::models::{Choice, ImageCandidate, SelectionOutcome};
use crate::Result;
use std::future::Future;
use std::num::NonZeroUsize;

pub const MORE_OPTIONS_VALUE: &str = "more";
pub const MORE_OPTIONS_LABEL: &str = "More options";

pub fn choices_for(batch: &[ImageCandidate], offer_more: bool) -> Vec<Choice> {
    let mut choices: Vec<Choice> = batch
        .iter()
        .enumerate()
        .map(|(index, candidate)| Choice {
            label: Some(format!("Option {}", index + 1)),
            image: Some(candidate.locator().to_string()),
            value: candidate.locator().to_string(),
        })
        .collect();

    if offer_more {
        choices.push(Choice {
            label: Some(MORE_OPTIONS_LABEL.to_string()),
            image: None,
            value: MORE_OPTIONS_VALUE.to_string(),
        });
    }
    choices
}

/// Run a single selection round over `batch`.
pub async fn present(
    interaction: &dyn Interaction,
    batch: &[ImageCandidate],
    offer_more: bool,
) -> Result<SelectionOutcome> {
    let choices = choices_for(batch, offer_more);
    let title = format!("Received {} options", batch.len());

    let answer = interaction.choose(&title, &choices).await?;

    Ok(match answer.as_deref() {
        None => SelectionOutcome::NoneChosen,
        Some(MORE_OPTIONS_VALUE) if offer_more => SelectionOutcome::RequestMore,
        Some(value) => match batch.iter().find(|c| c.locator() == value) {
            Some(candidate) => SelectionOutcome::Chosen(candidate.clone()),
            None => {
                tracing::warn!("Selection {:?} matches no presented option", value);
                SelectionOutcome::NoneChosen
            }
        },
    })
}

/// Loop until the user picks a candidate or gives up.
///
/// Returns `Chosen` or `NoneChosen`, never `RequestMore`. With `max_rounds`
/// set, the last permitted round omits the "More options" choice.
pub async fn select_from<F, Fut>(
    interaction: &dyn Interaction,
    initial: Vec<ImageCandidate>,
    max_rounds: Option<NonZeroUsize>,
    mut regenerate: F,
) -> Result<SelectionOutcome>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Vec<ImageCandidate>>,
{
    let mut batch = initial;
    let mut round = 1;

    loop {
        if batch.is_empty() {
            tracing::info!("No options left to present after {} round(s)", round - 1);
            return Ok(SelectionOutcome::NoneChosen);
        }

        let offer_more = max_rounds.map_or(true, |max| round < max.get());
        match present(interaction, &batch, offer_more).await? {
            SelectionOutcome::RequestMore => {
                tracing::info!("Round {}: more options requested", round);
                batch = regenerate().await;
                round += 1;
            }
            outcome => {
                tracing::debug!("Round {} resolved: {:?}", round, outcome);
                return Ok(outcome);
            }
        }
    }
}
