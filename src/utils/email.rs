use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use tracing::{instrument, warn};

use educore_models::leaves::{LeaveRequest, LeaveType};
use educore_standing::Notifier;

use crate::config::email::EmailConfig;
use crate::utils::errors::AppError;

/// SMTP-backed email sender.
///
/// Sending happens on the blocking pool. When SMTP is disabled via config
/// every send is a silent no-op, which keeps local development free of a
/// mail server requirement.
#[derive(Clone)]
pub struct EmailService {
    config: EmailConfig,
}

impl EmailService {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    #[instrument(skip(self, body))]
    pub async fn send(&self, to_email: &str, subject: &str, body: &str) -> Result<(), AppError> {
        if !self.config.enabled {
            return Ok(());
        }

        let from = format!("{} <{}>", self.config.from_name, self.config.from_email);

        let email = Message::builder()
            .from(
                from.parse()
                    .map_err(|e| AppError::internal(anyhow::anyhow!("Invalid from email: {e}")))?,
            )
            .to(to_email
                .parse()
                .map_err(|e| AppError::internal(anyhow::anyhow!("Invalid to email: {e}")))?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| AppError::internal(anyhow::anyhow!("Failed to build email: {e}")))?;

        let mailer = if self.config.smtp_username.is_empty() {
            SmtpTransport::builder_dangerous(&self.config.smtp_host)
                .port(self.config.smtp_port)
                .build()
        } else {
            let creds = Credentials::new(
                self.config.smtp_username.clone(),
                self.config.smtp_password.clone(),
            );

            SmtpTransport::relay(&self.config.smtp_host)
                .map_err(|e| {
                    AppError::internal(anyhow::anyhow!("Failed to create SMTP relay: {e}"))
                })?
                .port(self.config.smtp_port)
                .credentials(creds)
                .build()
        };

        tokio::task::spawn_blocking(move || mailer.send(&email))
            .await
            .map_err(|e| AppError::internal(anyhow::anyhow!("Task join error: {e}")))?
            .map_err(|e| AppError::internal(anyhow::anyhow!("Failed to send email: {e}")))?;

        Ok(())
    }

    /// Best-effort send: failures are logged and swallowed.
    pub async fn send_best_effort(&self, to_email: &str, subject: &str, body: &str) {
        if let Err(err) = self.send(to_email, subject, body).await {
            warn!(to = to_email, subject, error = %err.error, "email delivery failed");
        }
    }

    pub async fn send_leave_approval(&self, to_email: &str, full_name: &str, leave: &LeaveRequest) {
        let body = format!(
            "Hello {},\n\n\
             Your leave request has been approved.\n\n\
             Type: {}\n\
             Period: {} to {}\n\n\
             Best regards,\n\
             The administration",
            full_name,
            leave_type_label(leave.leave_type),
            leave.start_date,
            leave.end_date
        );
        self.send_best_effort(to_email, "Leave request approved", &body)
            .await;
    }

    pub async fn send_leave_rejection(
        &self,
        to_email: &str,
        full_name: &str,
        leave: &LeaveRequest,
        reason: &str,
    ) {
        let body = format!(
            "Hello {},\n\n\
             Your leave request has been rejected.\n\n\
             Reason: {}\n\
             Type: {}\n\
             Requested period: {} to {}\n\n\
             Best regards,\n\
             The administration",
            full_name,
            reason,
            leave_type_label(leave.leave_type),
            leave.start_date,
            leave.end_date
        );
        self.send_best_effort(to_email, "Leave request rejected", &body)
            .await;
    }

    pub async fn send_leave_cancellation(
        &self,
        to_email: &str,
        full_name: &str,
        leave: &LeaveRequest,
        reason: &str,
    ) {
        let body = format!(
            "Hello {},\n\n\
             Your leave has been cancelled.\n\n\
             Reason: {}\n\
             Type: {}\n\
             Period: {} to {}\n\n\
             Best regards,\n\
             The administration",
            full_name,
            reason,
            leave_type_label(leave.leave_type),
            leave.start_date,
            leave.end_date
        );
        self.send_best_effort(to_email, "Leave cancelled", &body)
            .await;
    }
}

fn leave_type_label(leave_type: LeaveType) -> &'static str {
    match leave_type {
        LeaveType::Annual => "annual leave",
        LeaveType::Sick => "sick leave",
        LeaveType::Maternity => "maternity leave",
        LeaveType::Unpaid => "unpaid leave",
    }
}

/// [`Notifier`] adapter handing standing-engine notifications to the mail
/// transport. Each send runs in its own task so a slow SMTP server can never
/// stall a grade or absence mutation.
#[derive(Clone)]
pub struct MailNotifier {
    email: EmailService,
}

impl MailNotifier {
    pub fn new(email: EmailService) -> Self {
        Self { email }
    }
}

impl Notifier for MailNotifier {
    fn notify(&self, recipient: &str, subject: &str, body: &str) {
        let email = self.email.clone();
        let recipient = recipient.to_string();
        let subject = subject.to_string();
        let body = body.to_string();
        tokio::spawn(async move {
            email.send_best_effort(&recipient, &subject, &body).await;
        });
    }
}
