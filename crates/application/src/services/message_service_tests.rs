//! 消息服务单元测试

use std::sync::Arc;

use domain::{DomainError, MessageId, MessageKind, Participant, ParticipantName, Timestamp};
use time::{macros::datetime, Duration};

use crate::clock::manual::ManualClock;
use crate::error::ApplicationError;
use crate::repository::memory::{MemoryMessageRepository, MemoryParticipantRepository};
use crate::repository::{MessageRepository, ParticipantRepository};
use crate::services::{
    DeleteMessageRequest, ListMessagesRequest, MessageService, MessageServiceDependencies,
    SendMessageRequest,
};

const START: Timestamp = datetime!(2024-05-01 09:30:00 UTC);

struct Fixture {
    service: MessageService,
    participants: Arc<MemoryParticipantRepository>,
    messages: Arc<MemoryMessageRepository>,
    clock: Arc<ManualClock>,
}

async fn fixture(active: &[&str]) -> Fixture {
    let participants = Arc::new(MemoryParticipantRepository::new());
    for name in active {
        participants
            .insert(Participant::join(ParticipantName::parse(name).unwrap(), START))
            .await
            .unwrap();
    }
    let messages = Arc::new(MemoryMessageRepository::new());
    let clock = Arc::new(ManualClock::new(START));
    let service = MessageService::new(MessageServiceDependencies {
        participant_repository: participants.clone(),
        message_repository: messages.clone(),
        clock: clock.clone(),
    });
    Fixture {
        service,
        participants,
        messages,
        clock,
    }
}

fn request(from: &str, to: &str, text: &str, kind: &str) -> SendMessageRequest {
    SendMessageRequest {
        from: from.to_owned(),
        to: to.to_owned(),
        text: text.to_owned(),
        kind: kind.to_owned(),
    }
}

fn texts_for(service_result: Vec<domain::Message>) -> Vec<String> {
    service_result
        .into_iter()
        .map(|m| m.text.as_str().to_owned())
        .collect()
}

#[tokio::test]
async fn send_broadcast_is_stored() {
    let f = fixture(&["alice"]).await;

    let sent = f
        .service
        .send(request("alice", "Todos", "hi all", "message"))
        .await
        .unwrap();

    assert_eq!(sent.kind, MessageKind::Broadcast);
    assert!(sent.to.is_everyone());
    assert_eq!(sent.time, "09:30:00");
    assert_eq!(f.messages.list_all().await.unwrap(), vec![sent]);
}

#[tokio::test]
async fn send_strips_markup_from_every_field() {
    let f = fixture(&["alice", "bob"]).await;

    let sent = f
        .service
        .send(request(
            "<i>alice</i>",
            " bob ",
            "<script>x</script> hello ",
            "private_message",
        ))
        .await
        .unwrap();

    assert_eq!(sent.from.as_str(), "alice");
    assert_eq!(sent.to.as_str(), "bob");
    assert_eq!(sent.text.as_str(), "x hello");
    assert_eq!(sent.kind, MessageKind::Direct);
}

#[tokio::test]
async fn send_from_inactive_sender_is_rejected() {
    let f = fixture(&["alice"]).await;

    let err = f
        .service
        .send(request("mallory", "Todos", "hi", "message"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ApplicationError::Domain(DomainError::SenderNotActive)
    ));
    assert!(f.messages.list_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn send_validates_input() {
    let f = fixture(&["alice"]).await;

    for bad in [
        request("alice", "Todos", "  ", "message"),
        request("alice", "Todos", "<b></b>", "message"),
        request("alice", "", "hi", "message"),
        request("alice", "Todos", "hi", "shout"),
        request("alice", "Todos", &"x".repeat(2001), "message"),
    ] {
        let err = f.service.send(bad).await.unwrap_err();
        assert!(matches!(
            err,
            ApplicationError::Domain(DomainError::InvalidArgument { .. })
        ));
    }
    assert!(f.messages.list_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn send_rejects_status_kind() {
    let f = fixture(&["alice"]).await;

    let err = f
        .service
        .send(request("alice", "Todos", "alice has left", "status"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ApplicationError::Domain(DomainError::InvalidArgument { .. })
    ));
}

#[tokio::test]
async fn direct_messages_are_visible_only_to_sender_and_recipient() {
    let f = fixture(&["alice", "bob", "carol"]).await;
    f.service
        .send(request("alice", "Todos", "hello everyone", "message"))
        .await
        .unwrap();
    f.service
        .send(request("alice", "bob", "psst bob", "private_message"))
        .await
        .unwrap();

    let list = |requester: Option<&str>| ListMessagesRequest {
        requester: requester.map(str::to_owned),
        limit: None,
    };

    let for_alice = f.service.list(list(Some("alice"))).await.unwrap();
    let for_bob = f.service.list(list(Some("bob"))).await.unwrap();
    let for_carol = f.service.list(list(Some("carol"))).await.unwrap();
    let anonymous = f.service.list(list(None)).await.unwrap();

    assert_eq!(texts_for(for_alice), vec!["hello everyone", "psst bob"]);
    assert_eq!(texts_for(for_bob), vec!["hello everyone", "psst bob"]);
    assert_eq!(texts_for(for_carol), vec!["hello everyone"]);
    assert_eq!(texts_for(anonymous), vec!["hello everyone"]);
}

#[tokio::test]
async fn unparseable_requester_reads_as_anonymous() {
    let f = fixture(&["alice", "bob"]).await;
    f.service
        .send(request("alice", "bob", "secret", "private_message"))
        .await
        .unwrap();

    let listed = f
        .service
        .list(ListMessagesRequest {
            requester: Some("<b></b>".to_owned()),
            limit: None,
        })
        .await
        .unwrap();
    assert!(listed.is_empty());
}

#[tokio::test]
async fn list_returns_most_recent_window_oldest_first() {
    let f = fixture(&["alice"]).await;
    for i in 0..10 {
        f.clock.advance(Duration::seconds(1));
        f.service
            .send(request("alice", "Todos", &format!("m{i}"), "message"))
            .await
            .unwrap();
    }

    let listed = f
        .service
        .list(ListMessagesRequest {
            requester: Some("alice".to_owned()),
            limit: Some(3),
        })
        .await
        .unwrap();
    assert_eq!(texts_for(listed), vec!["m7", "m8", "m9"]);

    let everything = f
        .service
        .list(ListMessagesRequest {
            requester: None,
            limit: Some(100),
        })
        .await
        .unwrap();
    assert_eq!(everything.len(), 10);
}

#[tokio::test]
async fn delete_by_non_owner_is_rejected_and_message_kept() {
    let f = fixture(&["alice", "bob"]).await;
    let sent = f
        .service
        .send(request("alice", "Todos", "mine", "message"))
        .await
        .unwrap();

    let err = f
        .service
        .delete(DeleteMessageRequest {
            id: sent.id,
            requester: "bob".to_owned(),
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ApplicationError::Domain(DomainError::NotMessageOwner)
    ));
    assert!(f.messages.find_by_id(sent.id).await.unwrap().is_some());
}

#[tokio::test]
async fn delete_unknown_message_is_not_found() {
    let f = fixture(&["alice"]).await;

    let err = f
        .service
        .delete(DeleteMessageRequest {
            id: MessageId::generate(),
            requester: "alice".to_owned(),
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ApplicationError::Domain(DomainError::MessageNotFound)
    ));
}

#[tokio::test]
async fn owner_can_delete_even_after_leaving() {
    let f = fixture(&["alice"]).await;
    let sent = f
        .service
        .send(request("alice", "Todos", "bye", "message"))
        .await
        .unwrap();
    f.participants
        .remove_stale(
            &ParticipantName::parse("alice").unwrap(),
            START + Duration::hours(1),
        )
        .await
        .unwrap();

    f.service
        .delete(DeleteMessageRequest {
            id: sent.id,
            requester: "alice".to_owned(),
        })
        .await
        .unwrap();

    assert!(f.messages.find_by_id(sent.id).await.unwrap().is_none());
    let err = f
        .service
        .delete(DeleteMessageRequest {
            id: sent.id,
            requester: "alice".to_owned(),
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ApplicationError::Domain(DomainError::MessageNotFound)
    ));
}
