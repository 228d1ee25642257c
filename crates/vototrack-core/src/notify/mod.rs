//! Reminder hand-off to the outbound notification channel.
//!
//! Message composition lives here; actual delivery is an external
//! collaborator behind `ReminderSender`, and the engine never observes a
//! delivery confirmation.

use std::time::Duration;

use crate::models::Voter;

/// Template for a one-off reminder. `{{nombre}}` is replaced with the
/// voter's given name.
pub const INDIVIDUAL_TEMPLATE: &str = "Hola {{nombre}}, te recordamos que hoy se celebran las \
     elecciones en FIBSAL. Tu participación es fundamental. ¡Te esperamos en tu mesa electoral!";

/// Template for the mass reminder sent to everyone still pending.
pub const MASS_TEMPLATE: &str = "Recordatorio de elecciones FIBSAL: Hola {{nombre}}, aún no \
     hemos registrado tu voto. Te animamos a participar antes del cierre de urnas. ¡Gracias!";

const SIMULATED_SEND_DELAY: Duration = Duration::from_millis(300);

/// Render a reminder message for one voter.
pub fn render_reminder(template: &str, voter: &Voter) -> String {
    template.replace("{{nombre}}", &voter.nombre)
}

/// Outbound delivery seam. Implementations hand the message to a transport;
/// the engine treats the hand-off itself as the outcome.
#[allow(async_fn_in_trait)]
pub trait ReminderSender {
    /// Hand off one reminder addressed to the voter's phone number.
    async fn send(&self, voter: &Voter, message: &str) -> bool;
}

/// Logging stand-in for a real SMS/WhatsApp gateway.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulatedSender;

impl ReminderSender for SimulatedSender {
    async fn send(&self, voter: &Voter, message: &str) -> bool {
        tokio::time::sleep(SIMULATED_SEND_DELAY).await;
        tracing::info!(
            telefono = %voter.telefono,
            "Simulated reminder delivery: {message}"
        );
        true
    }
}

/// Send the individual reminder template to one voter.
///
/// Returns whether the hand-off reported success.
pub async fn send_individual_reminder<S: ReminderSender>(sender: &S, voter: &Voter) -> bool {
    let message = render_reminder(INDIVIDUAL_TEMPLATE, voter);
    sender.send(voter, &message).await
}

/// Send the mass-reminder template to every voter in the batch.
///
/// Returns the number of hand-offs that reported success.
pub async fn send_mass_reminder<S: ReminderSender>(sender: &S, voters: &[Voter]) -> usize {
    let mut delivered = 0;
    for voter in voters {
        let message = render_reminder(MASS_TEMPLATE, voter);
        if sender.send(voter, &message).await {
            delivered += 1;
        }
    }
    delivered
}
