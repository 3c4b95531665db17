//! Channel roles.

use crate::client::ZelloClient;
use crate::error::ZelloResult;
use crate::types::{required_list, required_name, Command, Outcome, RoleSettings};

pub fn get_channels_roles_command(channel: &str) -> ZelloResult<Command> {
    Ok(Command::get("channel/roleslist").segment("name", required_name("channel name", channel)?))
}

pub fn save_channel_role_command(
    channel: &str,
    role: &str,
    settings: &RoleSettings,
) -> ZelloResult<Command> {
    Ok(Command::post("channel/saverole")
        .segment("channel", required_name("channel name", channel)?)
        .segment("name", required_name("role name", role)?)
        .form("settings", settings.to_json()?))
}

pub fn delete_channel_role_command<S: AsRef<str>>(
    channel: &str,
    roles: &[S],
) -> ZelloResult<Command> {
    Ok(Command::post("channel/deleterole")
        .segment("channel", required_name("channel name", channel)?)
        .form("roles", required_list("roles", roles)?))
}

pub fn add_to_channel_role_command<S: AsRef<str>>(
    channel: &str,
    role: &str,
    users: &[S],
) -> ZelloResult<Command> {
    Ok(Command::post("channel/addtorole")
        .segment("channel", required_name("channel name", channel)?)
        .segment("name", required_name("role name", role)?)
        .form("login", required_list("users", users)?))
}

impl ZelloClient {
    /// Roles defined on a channel.
    pub async fn get_channels_roles(&self, channel: &str) -> Outcome {
        self.execute_built(get_channels_roles_command(channel)).await
    }

    /// Create or update a role.
    pub async fn save_channel_role(&self, channel: &str, role: &str, settings: &RoleSettings) -> Outcome {
        self.execute_built(save_channel_role_command(channel, role, settings))
            .await
    }

    pub async fn delete_channel_role<S: AsRef<str>>(&self, channel: &str, roles: &[S]) -> Outcome {
        self.execute_built(delete_channel_role_command(channel, roles))
            .await
    }

    pub async fn add_to_channel_role<S: AsRef<str>>(
        &self,
        channel: &str,
        role: &str,
        users: &[S],
    ) -> Outcome {
        self.execute_built(add_to_channel_role_command(channel, role, users))
            .await
    }
}
