use domain::{Message, MessageKind, Participant};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 参与者的对外表示，`lastStatus` 为 Unix 毫秒时间戳。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantDto {
    pub name: String,
    pub last_status: i64,
}

impl From<&Participant> for ParticipantDto {
    fn from(participant: &Participant) -> Self {
        let millis = participant.last_status.unix_timestamp_nanos() / 1_000_000;
        Self {
            name: participant.name.as_str().to_owned(),
            last_status: i64::try_from(millis).unwrap_or(i64::MAX),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageDto {
    pub id: Uuid,
    pub from: String,
    pub to: String,
    pub text: String,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    pub time: String,
}

impl From<&Message> for MessageDto {
    fn from(message: &Message) -> Self {
        Self {
            id: Uuid::from(message.id),
            from: message.from.as_str().to_owned(),
            to: message.to.as_str().to_owned(),
            text: message.text.as_str().to_owned(),
            kind: message.kind,
            time: message.time.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::{MessageId, ParticipantName};
    use time::macros::datetime;

    #[test]
    fn participant_wire_shape() {
        let participant = Participant::join(
            ParticipantName::parse("alice").unwrap(),
            datetime!(1970-01-01 00:00:01.5 UTC),
        );
        let json = serde_json::to_value(ParticipantDto::from(&participant)).unwrap();
        assert_eq!(json, serde_json::json!({"name": "alice", "lastStatus": 1500}));
    }

    #[test]
    fn status_message_wire_shape() {
        let message = Message::entered(
            MessageId::generate(),
            ParticipantName::parse("alice").unwrap(),
            datetime!(2024-01-01 18:04:02 UTC),
        );
        let json = serde_json::to_value(MessageDto::from(&message)).unwrap();
        assert_eq!(json["from"], "alice");
        assert_eq!(json["to"], "Todos");
        assert_eq!(json["text"], "alice has entered");
        assert_eq!(json["type"], "status");
        assert_eq!(json["time"], "18:04:02");
    }
}
