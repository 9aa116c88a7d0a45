//! Documents and messages built from budget snapshots: the PDF quote, xlsx
//! exports, the monthly summary, WhatsApp links and e-mails.
//!
//! Everything here is a function of its inputs except mail delivery, which
//! goes through the [`Mailer`] trait.

pub use company::CompanyProfile;
pub use email::{
    DeliveryReport, DisabledMailer, Mailer, OutgoingEmail, RESEND_ENDPOINT, ResendMailer,
    compose_budget_email,
};
pub use error::DocumentError;
pub use report::{MonthlySummary, ReportMonth};
pub use whatsapp::{WhatsAppMessage, budget_whatsapp, normalize_phone};

mod company;
pub mod email;
mod error;
pub mod pdf;
pub mod report;
pub mod spreadsheet;
pub mod whatsapp;
