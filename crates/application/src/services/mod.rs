mod message_service;
mod presence_service;

#[cfg(test)]
mod message_service_tests;

pub use message_service::{
    DeleteMessageRequest, ListMessagesRequest, MessageService, MessageServiceDependencies,
    SendMessageRequest,
};
pub use presence_service::{PresenceService, PresenceServiceDependencies};
