//! Contact form notifications over SMTP.

use chrono::{Datelike, Utc};
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use tracing::{info, warn};

use crate::config::MailConfig;

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("invalid address: {0}")]
    Address(String),
    #[error("failed to build message: {0}")]
    Message(String),
    #[error("smtp error: {0}")]
    Transport(String),
}

/// A visitor's message from the public contact form.
#[derive(Debug, Clone)]
pub struct ContactMessage {
    pub first_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub message: String,
}

#[derive(Clone)]
pub struct Mailer {
    config: Option<MailConfig>,
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
}

impl Mailer {
    /// Without a config, messages are logged instead of sent.
    pub fn new(config: Option<MailConfig>) -> Result<Self, MailError> {
        let transport = match &config {
            Some(mail) => {
                let relay = if mail.secure {
                    AsyncSmtpTransport::<Tokio1Executor>::relay(&mail.smtp_host)
                } else {
                    AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&mail.smtp_host)
                };
                let builder = relay
                    .map_err(|e| MailError::Transport(format!("SMTP setup failed: {e}")))?
                    .port(mail.smtp_port);

                let builder = match (&mail.username, &mail.password) {
                    (Some(user), Some(pass)) if !user.is_empty() => {
                        builder.credentials(Credentials::new(user.clone(), pass.clone()))
                    }
                    _ => builder,
                };
                Some(builder.build())
            }
            None => None,
        };

        Ok(Self { config, transport })
    }

    pub fn disabled() -> Self {
        Self {
            config: None,
            transport: None,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.transport.is_some()
    }

    /// Forward a contact submission to the configured receiver.
    pub async fn send_contact(&self, contact: &ContactMessage) -> Result<(), MailError> {
        let (Some(config), Some(transport)) = (&self.config, &self.transport) else {
            warn!(
                from = %contact.email,
                name = %contact.first_name,
                "Mail relay not configured, contact message only logged"
            );
            return Ok(());
        };

        let visitor = Mailbox::new(
            Some(contact.first_name.clone()),
            contact
                .email
                .parse()
                .map_err(|e| MailError::Address(format!("{}: {e}", contact.email)))?,
        );

        let email = Message::builder()
            .from(
                config
                    .from_address
                    .parse()
                    .map_err(|e| MailError::Message(format!("invalid from address: {e}")))?,
            )
            .reply_to(visitor)
            .to(config
                .receiver
                .parse()
                .map_err(|e| MailError::Message(format!("invalid receiver address: {e}")))?)
            .subject(format!(
                "New Contact Form Submission from {}",
                contact.first_name
            ))
            .header(ContentType::TEXT_HTML)
            .body(render_contact_html(contact))
            .map_err(|e| MailError::Message(e.to_string()))?;

        transport
            .send(email)
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;

        info!(from = %contact.email, "Sent contact notification");
        Ok(())
    }
}

pub fn render_contact_html(contact: &ContactMessage) -> String {
    let name = escape_html(&contact.first_name);
    let email = escape_html(&contact.email);
    let phone = contact
        .phone
        .as_deref()
        .filter(|p| !p.trim().is_empty())
        .map(escape_html);
    let message = escape_html(&contact.message).replace('\n', "<br>");

    let call_button = phone
        .as_ref()
        .map(|p| {
            format!(
                r#"<a href="tel:{p}" style="background-color:#ff6b6b;color:white;text-decoration:none;padding:12px 25px;border-radius:6px;font-weight:bold;">Call</a>"#
            )
        })
        .unwrap_or_default();

    format!(
        r#"<div style="font-family:'Segoe UI',Arial,sans-serif;background-color:#f4f6f8;padding:30px;">
  <div style="max-width:600px;margin:auto;background-color:#ffffff;border-radius:12px;overflow:hidden;">
    <div style="background:#e94e4e;color:white;padding:25px;text-align:center;">
      <h1 style="margin:0;font-size:24px;">New Contact Form Submission</h1>
    </div>
    <div style="padding:25px;color:#333333;line-height:1.6;">
      <table style="width:100%;border-collapse:collapse;margin-bottom:20px;font-size:15px;">
        <tr><td style="padding:12px;font-weight:bold;width:120px;">Name</td><td style="padding:12px;">{name}</td></tr>
        <tr><td style="padding:12px;font-weight:bold;">Email</td><td style="padding:12px;">{email}</td></tr>
        <tr><td style="padding:12px;font-weight:bold;">Phone</td><td style="padding:12px;">{phone_cell}</td></tr>
        <tr><td style="padding:12px;font-weight:bold;">Message</td><td style="padding:12px;">{message}</td></tr>
      </table>
      <div style="text-align:center;margin-top:25px;">
        <a href="mailto:{email}" style="background-color:#e94e4e;color:white;text-decoration:none;padding:12px 25px;border-radius:6px;font-weight:bold;margin-right:10px;">Reply</a>
        {call_button}
      </div>
    </div>
    <div style="background-color:#f1f3f6;padding:20px;text-align:center;font-size:12px;color:#888888;">
      <p style="margin:0;">&copy; {year} All rights reserved.</p>
    </div>
  </div>
</div>"#,
        phone_cell = phone.as_deref().unwrap_or("N/A"),
        year = Utc::now().year(),
    )
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
