//! Discord Slash Commands
//!
//! Definitions for the bot's application commands, parsing of invocations into
//! [`SlashCommand`], and the text shown back to the user.

use std::collections::HashMap;

use bytes::Bytes;
use gifsmith_core::PipelineOutcome;
use serenity::all::{
    CommandInteraction, CommandOptionType, CreateCommand, CreateCommandOption, ResolvedValue,
};

pub const PONG: &str = "Pong!";
pub const FAILED_REPLY: &str = "Sorry, I couldn't process that file.";
pub const MISSING_SOURCE_REPLY: &str = "Please attach a file or provide a URL.";
pub const OUTPUT_FILENAME: &str = "output.gif";

/// Where a media command should read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaSource {
    Attachment(String),
    Url(String),
}

impl MediaSource {
    pub fn url(&self) -> &str {
        match self {
            MediaSource::Attachment(url) | MediaSource::Url(url) => url,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlashCommand {
    Ping,
    Printer { message: String },
    Image { url: String },
    ToGif { source: MediaSource },
    Caption { text: String, source: MediaSource },
}

impl SlashCommand {
    /// Whether the command does slow work and should be deferred first.
    pub fn is_deferred(&self) -> bool {
        matches!(self, SlashCommand::ToGif { .. } | SlashCommand::Caption { .. })
    }
}

/// Why an invocation could not be turned into a [`SlashCommand`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    Unknown(String),
    MissingOption(&'static str),
    MissingSource,
}

impl ParseError {
    /// Text to show the invoking user.
    pub fn reply(&self) -> String {
        match self {
            ParseError::Unknown(name) => format!("Unknown command /{name}."),
            ParseError::MissingOption(option) => format!("Missing required option `{option}`."),
            ParseError::MissingSource => MISSING_SOURCE_REPLY.to_string(),
        }
    }
}

/// The option values of one invocation, with attachments resolved to their URLs.
#[derive(Debug, Clone, Default)]
pub struct CommandArgs {
    pub name: String,
    pub strings: HashMap<String, String>,
    pub attachments: HashMap<String, String>,
}

impl CommandArgs {
    pub fn from_interaction(command: &CommandInteraction) -> Self {
        let mut args = CommandArgs {
            name: command.data.name.clone(),
            ..Default::default()
        };
        for option in command.data.options() {
            match option.value {
                ResolvedValue::String(value) => {
                    args.strings.insert(option.name.to_string(), value.to_string());
                }
                ResolvedValue::Attachment(attachment) => {
                    args.attachments
                        .insert(option.name.to_string(), attachment.url.clone());
                }
                _ => {}
            }
        }
        args
    }

    fn string(&self, name: &str) -> Option<&str> {
        self.strings
            .get(name)
            .map(String::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// An attached file wins over a URL when both are given.
    fn source(&self) -> Option<MediaSource> {
        if let Some(url) = self.attachments.get("file") {
            return Some(MediaSource::Attachment(url.clone()));
        }
        self.string("url").map(|url| MediaSource::Url(url.to_string()))
    }
}

pub fn parse(args: &CommandArgs) -> Result<SlashCommand, ParseError> {
    match args.name.as_str() {
        "ping" => Ok(SlashCommand::Ping),
        "printer" => {
            let message = args
                .strings
                .get("message")
                .filter(|m| !m.is_empty())
                .ok_or(ParseError::MissingOption("message"))?;
            Ok(SlashCommand::Printer {
                message: message.clone(),
            })
        }
        "image" => {
            let url = args
                .attachments
                .get("image")
                .ok_or(ParseError::MissingOption("image"))?;
            Ok(SlashCommand::Image { url: url.clone() })
        }
        "togif" => Ok(SlashCommand::ToGif {
            source: args.source().ok_or(ParseError::MissingSource)?,
        }),
        "caption" => {
            let text = args
                .strings
                .get("text")
                .ok_or(ParseError::MissingOption("text"))?;
            Ok(SlashCommand::Caption {
                text: text.clone(),
                source: args.source().ok_or(ParseError::MissingSource)?,
            })
        }
        other => Err(ParseError::Unknown(other.to_string())),
    }
}

/// What to send back once a media command finishes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Gif(Bytes),
    Text(String),
}

impl From<PipelineOutcome> for Reply {
    fn from(outcome: PipelineOutcome) -> Self {
        match outcome {
            PipelineOutcome::Gif(bytes) => Reply::Gif(bytes),
            PipelineOutcome::Disabled(message) => Reply::Text(message),
            PipelineOutcome::Failed => Reply::Text(FAILED_REPLY.to_string()),
        }
    }
}

fn source_options(command: CreateCommand) -> CreateCommand {
    command
        .add_option(CreateCommandOption::new(
            CommandOptionType::Attachment,
            "file",
            "Image or video to use",
        ))
        .add_option(CreateCommandOption::new(
            CommandOptionType::String,
            "url",
            "Link to an image or video",
        ))
}

/// Every command the bot registers.
pub fn definitions() -> Vec<CreateCommand> {
    vec![
        CreateCommand::new("ping").description("Responds with pong"),
        CreateCommand::new("printer")
            .description("I will print whatever you say")
            .add_option(
                CreateCommandOption::new(CommandOptionType::String, "message", "What to print")
                    .required(true),
            ),
        CreateCommand::new("image")
            .description("I will print the image you send")
            .add_option(
                CreateCommandOption::new(CommandOptionType::Attachment, "image", "The image")
                    .required(true),
            ),
        source_options(CreateCommand::new("togif").description("Convert an image or video to a GIF")),
        // Required options must come before optional ones.
        source_options(
            CreateCommand::new("caption")
                .description("Add a caption above a GIF")
                .add_option(
                    CreateCommandOption::new(CommandOptionType::String, "text", "Caption text")
                        .required(true),
                ),
        ),
    ]
}
