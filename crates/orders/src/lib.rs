//! Order lifecycle: payment initiation, confirmation, admin decision and
//! invite link issuance.

pub use error::{IssuanceError, OrderError};
pub use invite::{InviteIssuer, InviteMinter, InviteRequest, MintError};
pub use lifecycle::{Approval, ApproveOutcome, ConfirmOutcome, OrderSettings, Orders, RejectOutcome, StartPayment};
pub use payment::{PaymentDetails, PngQr, QrRenderer};

mod error;
mod invite;
mod lifecycle;
mod locks;
mod payment;
