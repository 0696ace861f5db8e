//! Errors raised by screens before anything is sent.

use thiserror::Error;

use crate::attachment::AttachmentError;

use super::ScreenKind;

#[derive(Debug, Error)]
pub enum ScreenError {
    #[error("Prompt must not be blank")]
    BlankPrompt,

    #[error("The {kind} screen does not accept image attachments")]
    AttachmentsUnsupported { kind: ScreenKind },

    #[error(transparent)]
    Attachment(#[from] AttachmentError),
}
