use std::sync::Arc;

use crate::discord_slash::{self, CommandArgs, Reply, SlashCommand, OUTPUT_FILENAME, PONG};
use crate::ChannelAdapter;
use async_trait::async_trait;
use gifsmith_media::MediaPipeline;
use serenity::all::{
    Command, CommandInteraction, CreateAttachment, CreateInteractionResponse,
    CreateInteractionResponseMessage, EditInteractionResponse, GuildId, Interaction,
};
use serenity::model::channel::Message as DiscordMessage;
use serenity::model::gateway::Ready;
use serenity::prelude::*;
use tracing::{debug, error, info, warn};

struct Handler {
    pipeline: Arc<MediaPipeline>,
    guild_id: Option<GuildId>,
}

impl Handler {
    async fn register_commands(&self, ctx: &Context) -> serenity::Result<usize> {
        let commands = discord_slash::definitions();
        let registered = match self.guild_id {
            Some(guild) => guild.set_commands(&ctx.http, commands).await?,
            None => Command::set_global_commands(&ctx.http, commands).await?,
        };
        Ok(registered.len())
    }

    async fn handle_command(&self, ctx: &Context, command: &CommandInteraction) -> serenity::Result<()> {
        let parsed = discord_slash::parse(&CommandArgs::from_interaction(command));
        info!(
            command = %command.data.name,
            user = %command.user.name,
            guild = ?command.guild_id,
            "Received slash command"
        );

        let cmd = match parsed {
            Ok(cmd) => cmd,
            Err(e) => return respond(ctx, command, e.reply()).await,
        };
        if cmd.is_deferred() {
            command.defer(ctx).await?;
        }

        match cmd {
            SlashCommand::Ping => respond(ctx, command, PONG.to_string()).await,
            SlashCommand::Printer { message } => respond(ctx, command, message).await,
            SlashCommand::Image { url } => respond(ctx, command, url).await,
            SlashCommand::ToGif { source } => {
                let outcome = self.pipeline.to_gif(source.url()).await;
                follow_up(ctx, command, outcome.into()).await
            }
            SlashCommand::Caption { text, source } => {
                let outcome = self.pipeline.caption_gif(source.url(), &text).await;
                follow_up(ctx, command, outcome.into()).await
            }
        }
    }
}

async fn respond(ctx: &Context, command: &CommandInteraction, text: String) -> serenity::Result<()> {
    let message = CreateInteractionResponseMessage::new().content(text);
    command
        .create_response(ctx, CreateInteractionResponse::Message(message))
        .await
}

/// Replace the deferred "thinking" placeholder with the result.
async fn follow_up(ctx: &Context, command: &CommandInteraction, reply: Reply) -> serenity::Result<()> {
    let edit = match reply {
        Reply::Gif(bytes) => EditInteractionResponse::new()
            .new_attachment(CreateAttachment::bytes(bytes.to_vec(), OUTPUT_FILENAME)),
        Reply::Text(text) => EditInteractionResponse::new().content(text),
    };
    command.edit_response(ctx, edit).await.map(|_| ())
}

#[async_trait]
impl EventHandler for Handler {
    async fn message(&self, _ctx: Context, msg: DiscordMessage) {
        if msg.author.bot {
            return;
        }
        debug!(channel_id = %msg.channel_id, author = %msg.author.name, "Ignoring plain message");
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        let Interaction::Command(command) = interaction else {
            return;
        };
        if command.user.bot {
            return;
        }
        if let Err(e) = self.handle_command(&ctx, &command).await {
            error!(command = %command.data.name, "Error answering interaction: {:?}", e);
        }
    }

    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("{} is connected!", ready.user.name);
        match self.register_commands(&ctx).await {
            Ok(count) => info!(count, guild = ?self.guild_id, "Synced slash commands"),
            Err(e) => warn!("Failed to sync commands: {:?}", e),
        }
    }
}

pub struct DiscordAdapter {
    token: String,
    guild_id: Option<u64>,
    pipeline: Arc<MediaPipeline>,
}

impl DiscordAdapter {
    /// `guild_id` registers commands on one guild (instant updates while
    /// developing) instead of globally.
    pub fn new(token: String, guild_id: Option<u64>, pipeline: Arc<MediaPipeline>) -> Self {
        Self {
            token,
            guild_id,
            pipeline,
        }
    }

    pub fn intents() -> GatewayIntents {
        GatewayIntents::non_privileged()
            | GatewayIntents::DIRECT_MESSAGES
            | GatewayIntents::MESSAGE_CONTENT
    }
}

#[async_trait]
impl ChannelAdapter for DiscordAdapter {
    fn name(&self) -> &str { "discord" }

    async fn start(&self) -> anyhow::Result<()> {
        info!("Starting Discord adapter");

        let handler = Handler {
            pipeline: self.pipeline.clone(),
            guild_id: self.guild_id.filter(|id| *id != 0).map(GuildId::new),
        };
        let mut client = Client::builder(&self.token, Self::intents())
            .event_handler(handler)
            .await?;

        if let Err(why) = client.start().await {
            error!("Client error: {:?}", why);
            anyhow::bail!("Discord client error: {:?}", why);
        }

        Ok(())
    }
}
