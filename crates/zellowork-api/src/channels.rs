//! Channel management.

use crate::client::ZelloClient;
use crate::error::ZelloResult;
use crate::types::{required_list, required_name, ChannelQuery, Command, Outcome};

pub fn get_channels_command(query: &ChannelQuery) -> Command {
    let mut cmd = Command::get("channel/get");
    if let Some(name) = query.name.as_deref().filter(|s| !s.is_empty()) {
        cmd = cmd.segment("name", name);
    }
    if let Some(max) = query.max.filter(|m| *m > 0) {
        cmd = cmd.segment("max", max);
    }
    if let Some(start) = query.start.filter(|s| *s > 0) {
        cmd = cmd.segment("start", start);
    }
    cmd
}

/// `is_group` creates a group channel (otherwise dynamic); `is_hidden`
/// together with `is_group` makes it a hidden group.
pub fn add_channel_command(name: &str, is_group: bool, is_hidden: bool) -> ZelloResult<Command> {
    Ok(Command::get("channel/add")
        .segment("name", required_name("channel name", name)?)
        .segment("shared", is_group)
        .segment("invisible", is_hidden))
}

pub fn delete_channels_command<S: AsRef<str>>(channels: &[S]) -> ZelloResult<Command> {
    Ok(Command::post("channel/delete").form("name", required_list("channels", channels)?))
}

impl ZelloClient {
    pub async fn get_channels(&self, query: &ChannelQuery) -> Outcome {
        self.execute(get_channels_command(query)).await
    }

    pub async fn add_channel(&self, name: &str, is_group: bool, is_hidden: bool) -> Outcome {
        self.execute_built(add_channel_command(name, is_group, is_hidden))
            .await
    }

    pub async fn delete_channels<S: AsRef<str>>(&self, channels: &[S]) -> Outcome {
        self.execute_built(delete_channels_command(channels)).await
    }
}
