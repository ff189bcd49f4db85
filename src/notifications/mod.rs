//! Outbound email for habit reminders.
//!
//! Delivery only; deciding which habits qualify lives in
//! `habits::reminders`.

use anyhow::Result;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use crate::config::SmtpConfig;
use crate::db::{Habit, User};

pub struct Mailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl Mailer {
    pub fn from_config(config: &SmtpConfig) -> Result<Self> {
        let from: Mailbox = config.from_address.parse()?;

        let builder =
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)?.port(config.port);

        let builder = if let (Some(username), Some(password)) =
            (&config.username, &config.password)
        {
            builder.credentials(Credentials::new(username.clone(), password.clone()))
        } else {
            builder
        };

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }

    /// Send one reminder email listing the user's unlogged habits.
    pub async fn send_habit_reminder(&self, user: &User, habits: &[Habit]) -> Result<()> {
        let to: Mailbox = user.email.parse()?;

        let mut body = String::from(
            "Keep your streak alive!\n\nYou have habits waiting to be logged today:\n",
        );
        for habit in habits {
            body.push_str(&format!("  - {}\n", habit.name));
        }

        let email = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject("Habit reminders")
            .header(ContentType::TEXT_PLAIN)
            .body(body)?;

        self.transport.send(email).await?;
        Ok(())
    }
}
