//! Transactional email.
//!
//! Handlers enqueue `Email`s on a `NotificationDispatcher` and return immediately.
//! A background worker drains the bounded queue through a `Mailer`, retrying each
//! email a bounded number of times. Failures, and emails dropped because the queue
//! is full, are logged and never reach the HTTP caller.

use async_trait::async_trait;
use lettre::{
    message::header::ContentType, transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::AppError;

pub const GUEST_BOOKING_SUBJECT: &str = "Booking Successful!";
pub const HOST_BOOKING_SUBJECT: &str = "Your room got booked!";

/// One outgoing HTML email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    pub to: String,
    pub subject: String,
    pub html: String,
}

impl Email {
    /// Wraps `message` in a paragraph, the only markup the templates use.
    pub fn new(to: &str, subject: &str, message: &str) -> Self {
        Self {
            to: to.to_string(),
            subject: subject.to_string(),
            html: format!("<p>{}</p>", message),
        }
    }
}

/// Confirmation for the guest and notice for the host of a new booking.
pub fn booking_emails(
    guest: &str,
    host: &str,
    booking_id: &str,
    transaction_id: &str,
) -> [Email; 2] {
    let summary = format!(
        "Booking Id: {}, TransactionId: {}",
        booking_id, transaction_id
    );
    [
        Email::new(guest, GUEST_BOOKING_SUBJECT, &summary),
        Email::new(
            host,
            HOST_BOOKING_SUBJECT,
            &format!("{}. Check dashboard for more info", summary),
        ),
    ]
}

/// Delivers a single email.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &Email) -> Result<(), AppError>;
}

/// Authenticated SMTP relay, sending from the account it logs in as.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
}

impl SmtpMailer {
    pub fn new(relay: &str, user: &str, password: &str) -> Result<Self, AppError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(relay)?
            .credentials(Credentials::new(user.to_string(), password.to_string()))
            .build();
        Ok(Self {
            transport,
            from: user.to_string(),
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: &Email) -> Result<(), AppError> {
        let message = Message::builder()
            .from(self.from.parse()?)
            .to(email.to.parse()?)
            .subject(email.subject.clone())
            .header(ContentType::TEXT_HTML)
            .body(email.html.clone())?;

        let response = self.transport.send(message).await?;
        log::info!(
            "Email sent to {}: {}",
            email.to,
            response.message().collect::<Vec<_>>().join(" ")
        );
        Ok(())
    }
}

/// Queue size and retry policy of the delivery worker.
#[derive(Debug, Clone, Copy)]
pub struct DeliveryPolicy {
    pub max_attempts: u32,
    pub retry_delay: Duration,
    /// Emails waiting beyond this many are dropped instead of queued.
    pub queue_capacity: usize,
}

impl Default for DeliveryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            retry_delay: Duration::from_secs(5),
            queue_capacity: 1024,
        }
    }
}

/// Cheap-to-clone handle that queues emails for the delivery worker.
#[derive(Clone)]
pub struct NotificationDispatcher {
    queue: mpsc::Sender<Email>,
}

impl NotificationDispatcher {
    /// Starts the delivery worker on the current tokio runtime.
    ///
    /// The worker exits once every dispatcher clone has been dropped and the queue
    /// is drained; await the returned handle to flush pending mail on shutdown.
    pub fn spawn(mailer: Arc<dyn Mailer>, policy: DeliveryPolicy) -> (Self, JoinHandle<()>) {
        let (queue, inbox) = mpsc::channel(policy.queue_capacity.max(1));
        let worker = tokio::spawn(deliver(inbox, mailer, policy));
        (Self { queue }, worker)
    }

    /// Queues `html_message` for `recipient`. Never blocks and never fails the
    /// caller; a full or closed queue is only logged.
    pub fn send(&self, subject: &str, html_message: &str, recipient: &str) -> bool {
        self.enqueue(Email::new(recipient, subject, html_message))
    }

    /// Returns whether the email was queued.
    pub fn enqueue(&self, email: Email) -> bool {
        match self.queue.try_send(email) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(email)) => {
                log::error!(
                    "notification queue is full; dropping '{}' to {}",
                    email.subject,
                    email.to
                );
                false
            }
            Err(mpsc::error::TrySendError::Closed(email)) => {
                log::error!("notification worker is gone; dropping email to {}", email.to);
                false
            }
        }
    }
}

async fn deliver(
    mut inbox: mpsc::Receiver<Email>,
    mailer: Arc<dyn Mailer>,
    policy: DeliveryPolicy,
) {
    log::info!("notification worker started");
    while let Some(email) = inbox.recv().await {
        deliver_one(mailer.as_ref(), &email, policy).await;
    }
    log::info!("notification worker stopped");
}

async fn deliver_one(mailer: &dyn Mailer, email: &Email, policy: DeliveryPolicy) {
    let max_attempts = policy.max_attempts.max(1);
    for attempt in 1..=max_attempts {
        match mailer.send(email).await {
            Ok(()) => return,
            Err(e) if attempt < max_attempts => {
                log::warn!(
                    "sending '{}' to {} failed (attempt {}/{}): {}",
                    email.subject,
                    email.to,
                    attempt,
                    max_attempts,
                    e
                );
                tokio::time::sleep(policy.retry_delay).await;
            }
            Err(e) => {
                log::error!(
                    "giving up on '{}' to {} after {} attempts: {}",
                    email.subject,
                    email.to,
                    max_attempts,
                    e
                );
            }
        }
    }
}
