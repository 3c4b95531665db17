//! User management: list, save, delete, channel membership.

use crate::client::ZelloClient;
use crate::error::ZelloResult;
use crate::types::{required_list, required_name, Command, Outcome, UserAttributes, UserQuery};

pub fn get_users_command(query: &UserQuery) -> Command {
    let mut cmd = Command::get("user/get");
    if let Some(username) = query.username.as_deref().filter(|s| !s.is_empty()) {
        cmd = cmd.segment("login", username);
    }
    if let Some(channel) = query.channel.as_deref().filter(|s| !s.is_empty()) {
        cmd = cmd.segment("channel", channel);
    }
    if query.is_gateway {
        cmd = cmd.segment("gateway", 1);
    }
    if let Some(max) = query.max.filter(|m| *m > 0) {
        cmd = cmd.segment("max", max);
    }
    if let Some(start) = query.start.filter(|s| *s > 0) {
        cmd = cmd.segment("start", start);
    }
    cmd
}

pub fn add_to_channel_command<S: AsRef<str>>(channel: &str, users: &[S]) -> ZelloResult<Command> {
    Ok(Command::post("user/addto")
        .path(required_name("channel name", channel)?)
        .form("login", required_list("users", users)?))
}

pub fn add_to_channels_command<C: AsRef<str>, S: AsRef<str>>(
    channels: &[C],
    users: &[S],
) -> ZelloResult<Command> {
    Ok(Command::post("user/addtochannels")
        .form("users", required_list("users", users)?)
        .form("channels", required_list("channels", channels)?))
}

pub fn remove_from_channel_command<S: AsRef<str>>(
    channel: &str,
    users: &[S],
) -> ZelloResult<Command> {
    Ok(Command::post("user/removefrom")
        .path(required_name("channel name", channel)?)
        .form("login", required_list("users", users)?))
}

pub fn remove_from_channels_command<C: AsRef<str>, S: AsRef<str>>(
    channels: &[C],
    users: &[S],
) -> ZelloResult<Command> {
    Ok(Command::post("user/removefromchannels")
        .form("users", required_list("users", users)?)
        .form("channels", required_list("channels", channels)?))
}

pub fn save_user_command(user: &UserAttributes) -> ZelloResult<Command> {
    let form = user.to_form()?;
    Ok(form
        .into_iter()
        .fold(Command::post("user/save"), |cmd, (key, value)| cmd.form(&key, value)))
}

pub fn delete_users_command<S: AsRef<str>>(users: &[S]) -> ZelloResult<Command> {
    Ok(Command::post("user/delete").form("login", required_list("users", users)?))
}

impl ZelloClient {
    /// List users. With no filters, returns every user.
    pub async fn get_users(&self, query: &UserQuery) -> Outcome {
        self.execute(get_users_command(query)).await
    }

    /// Add users to a channel.
    pub async fn add_to_channel<S: AsRef<str>>(&self, channel: &str, users: &[S]) -> Outcome {
        self.execute_built(add_to_channel_command(channel, users)).await
    }

    /// Add users to several channels at once.
    pub async fn add_to_channels<C: AsRef<str>, S: AsRef<str>>(
        &self,
        channels: &[C],
        users: &[S],
    ) -> Outcome {
        self.execute_built(add_to_channels_command(channels, users)).await
    }

    pub async fn remove_from_channel<S: AsRef<str>>(&self, channel: &str, users: &[S]) -> Outcome {
        self.execute_built(remove_from_channel_command(channel, users)).await
    }

    pub async fn remove_from_channels<C: AsRef<str>, S: AsRef<str>>(
        &self,
        channels: &[C],
        users: &[S],
    ) -> Outcome {
        self.execute_built(remove_from_channels_command(channels, users)).await
    }

    /// Create or update a user. Set `add` to refuse updates of an existing user.
    pub async fn save_user(&self, user: &UserAttributes) -> Outcome {
        self.execute_built(save_user_command(user)).await
    }

    pub async fn delete_users<S: AsRef<str>>(&self, users: &[S]) -> Outcome {
        self.execute_built(delete_users_command(users)).await
    }
}
