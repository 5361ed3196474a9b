//! Email service for booking confirmations and group member invitations

use lettre::{
    message::{header::ContentType, Mailbox, Message, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    SmtpTransport, Transport,
};
use std::str::FromStr;

use crate::{
    config::{EmailConfig, MuseumConfig},
    error::{AppError, AppResult},
    models::booking::Booking,
};

#[derive(Clone)]
pub struct EmailService {
    config: EmailConfig,
    museum: MuseumConfig,
}

impl EmailService {
    pub fn new(config: EmailConfig, museum: MuseumConfig) -> Self {
        Self { config, museum }
    }

    /// Link a visitor follows to fill in their details or show their QR ticket
    pub fn visitor_link(&self, token: &str) -> String {
        format!("{}/visitor/{}", self.museum.public_url.trim_end_matches('/'), token)
    }

    /// Confirm a booking to its main visitor
    pub async fn send_booking_confirmation(
        &self,
        to: &str,
        booking: &Booking,
        token: &str,
    ) -> AppResult<()> {
        let subject = format!("Your {} visit on {}", self.museum.name, booking.booking_date);
        let body = format!(
            r#"
Hello {name},

Your visit to {museum} is booked for {date} ({slot}).
Booking reference: #{id}

Show the QR code on this page at the entrance:
{link}
"#,
            name = booking.visitor_name,
            museum = self.museum.name,
            date = booking.booking_date,
            slot = booking.time_slot,
            id = booking.id,
            link = self.visitor_link(token),
        );

        self.send_email(to, &subject, &body).await
    }

    /// Invite a group member to complete their visitor details
    pub async fn send_member_invite(
        &self,
        to: &str,
        booking: &Booking,
        token: &str,
    ) -> AppResult<()> {
        let subject = format!("{} invited you to visit {}", booking.visitor_name, self.museum.name);
        let body = format!(
            r#"
Hello,

{leader} added you to a group visit to {museum} on {date} ({slot}).

Please complete your visitor details here:
{link}

The same page will show your QR code for check-in on the day of the visit.
"#,
            leader = booking.visitor_name,
            museum = self.museum.name,
            date = booking.booking_date,
            slot = booking.time_slot,
            link = self.visitor_link(token),
        );

        self.send_email(to, &subject, &body).await
    }

    async fn send_email(&self, to: &str, subject: &str, body: &str) -> AppResult<()> {
        if !self.config.enabled {
            tracing::info!(to, subject, "Email delivery disabled, message not sent");
            return Ok(());
        }

        let from_name = self
            .config
            .smtp_from_name
            .as_deref()
            .unwrap_or(self.museum.name.as_str());
        let from_mailbox = Mailbox::from_str(&format!("{} <{}>", from_name, self.config.smtp_from))
            .map_err(|e| AppError::Internal(format!("Invalid from address: {}", e)))?;

        let to_mailbox = Mailbox::from_str(to)
            .map_err(|e| AppError::Validation(format!("Invalid email address {}: {}", to, e)))?;

        let email = Message::builder()
            .from(from_mailbox)
            .to(to_mailbox)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(body.to_string()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html_body(body)),
                    ),
            )
            .map_err(|e| AppError::Internal(format!("Failed to build email: {}", e)))?;

        let mailer_builder = if self.config.smtp_use_tls {
            SmtpTransport::starttls_relay(&self.config.smtp_host)
                .map_err(|e| AppError::Internal(format!("Failed to create SMTP transport: {}", e)))?
        } else {
            SmtpTransport::builder_dangerous(&self.config.smtp_host)
        }
        .port(self.config.smtp_port);

        let mailer_builder = if let (Some(username), Some(password)) =
            (&self.config.smtp_username, &self.config.smtp_password)
        {
            mailer_builder.credentials(Credentials::new(username.clone(), password.clone()))
        } else {
            mailer_builder
        };

        let mailer = mailer_builder.build();

        // SmtpTransport blocks on network I/O
        tokio::task::spawn_blocking(move || mailer.send(&email))
            .await
            .map_err(|e| AppError::Internal(format!("Email task failed: {}", e)))?
            .map_err(|e| AppError::Internal(format!("Failed to send email: {}", e)))?;

        Ok(())
    }
}

/// HTML alternative of a plain-text body. Booking fields are user input.
fn html_body(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            '\n' => escaped.push_str("<br>"),
            _ => escaped.push(c),
        }
    }
    format!("<html><body><pre>{}</pre></body></html>", escaped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_body_escapes_markup() {
        let html = html_body("Hello <script>alert(\"x\")</script> & <a href='https://evil'>Click</a>\nBye");
        assert!(!html.contains("<script>"));
        assert!(!html.contains("<a "));
        assert!(html.contains("&lt;script&gt;alert(&quot;x&quot;)&lt;/script&gt; &amp;"));
        assert!(html.contains("&lt;a href=&#39;https://evil&#39;&gt;"));
        assert!(html.contains("<br>Bye"));
    }

    #[test]
    fn test_visitor_link_trims_trailing_slash() {
        let museum = MuseumConfig {
            public_url: "https://museo.example.ph/".to_string(),
            ..MuseumConfig::default()
        };
        let service = EmailService::new(EmailConfig::default(), museum);
        assert_eq!(
            service.visitor_link("abc123"),
            "https://museo.example.ph/visitor/abc123"
        );
    }
}
