//! 按请求者过滤消息日志。
//!
//! 输入必须已按插入顺序排列（最旧在前）；输出保持该顺序。
//! 指定 `limit` 时只保留最近的 `limit` 条可见消息，窗口内仍然最旧在前。

use crate::message::Message;
use crate::value_objects::ParticipantName;

pub fn visible_messages(
    messages: impl IntoIterator<Item = Message>,
    requester: Option<&ParticipantName>,
    limit: Option<usize>,
) -> Vec<Message> {
    let mut visible: Vec<Message> = messages
        .into_iter()
        .filter(|message| message.is_visible_to(requester))
        .collect();

    if let Some(limit) = limit {
        let excess = visible.len().saturating_sub(limit);
        visible.drain(..excess);
    }

    visible
}
