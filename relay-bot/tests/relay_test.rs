//! End-to-end relay behavior against a recording client

use std::sync::Arc;

use relay_bot::client::{ClientError, RecordingClient, Sent};
use relay_bot::relay::NOT_A_MEMBER;
use relay_bot::{
    build_commands, Channel, ChannelId, GuildId, Message, Relay, RelayConfig, RelayOutcome, User,
    UserId,
};
use relay_commands::{Args, Command, GroupOptions};

const INPUT: ChannelId = ChannelId(10);
const OUTPUT: ChannelId = ChannelId(20);
const ELSEWHERE: ChannelId = ChannelId(99);

fn settings() -> RelayConfig {
    RelayConfig {
        guild_id: GuildId(1),
        input_channel: INPUT,
        output_channel: OUTPUT,
        prefix: "!".to_string(),
    }
}

fn moderator() -> User {
    User::new(100, "mod").with_nick("Moderator Mo")
}

fn student() -> User {
    User::new(200, "steve")
}

fn setup() -> (Relay, Arc<RecordingClient>) {
    let client = Arc::new(
        RecordingClient::new()
            .with_member(moderator())
            .with_member(student()),
    );
    let commands = Arc::new(build_commands().unwrap());
    let relay = Relay::new(commands, client.clone(), settings());
    (relay, client)
}

fn in_input(author: User, content: &str) -> Message {
    Message::new(author, Channel::Guild(INPUT), content)
}

#[tokio::test]
async fn test_bot_messages_are_ignored() {
    let (relay, client) = setup();
    let bot = User::new(1, "other-bot").as_bot();

    let outcome = relay
        .on_message(Message::new(bot, Channel::Direct(UserId(1)), "hello"))
        .await
        .unwrap();
    assert_eq!(outcome, RelayOutcome::Ignored);
    assert!(client.sent().is_empty());
}

#[tokio::test]
async fn test_other_channels_are_ignored() {
    let (relay, client) = setup();
    let outcome = relay
        .on_message(Message::new(moderator(), Channel::Guild(ELSEWHERE), "!send hi"))
        .await
        .unwrap();
    assert_eq!(outcome, RelayOutcome::Ignored);
    assert!(client.sent().is_empty());
}

#[tokio::test]
async fn test_input_channel_chatter_is_ignored() {
    let (relay, client) = setup();
    let outcome = relay
        .on_message(in_input(moderator(), "just chatting"))
        .await
        .unwrap();
    assert_eq!(outcome, RelayOutcome::Ignored);
    assert!(client.sent().is_empty());
}

#[tokio::test]
async fn test_direct_message_is_forwarded() {
    let (relay, client) = setup();
    let outcome = relay
        .on_message(Message::new(
            student(),
            Channel::Direct(UserId(200)),
            "When is the deadline?",
        ))
        .await
        .unwrap();

    assert_eq!(outcome, RelayOutcome::Forwarded);
    assert_eq!(
        client.sent(),
        vec![Sent::Channel(
            OUTPUT,
            "<@!200> sent:\nWhen is the deadline?".to_string()
        )]
    );
}

#[tokio::test]
async fn test_direct_message_from_non_member_is_rejected() {
    let (relay, client) = setup();
    let stranger = User::new(300, "stranger");
    let outcome = relay
        .on_message(Message::new(stranger, Channel::Direct(UserId(300)), "hi"))
        .await
        .unwrap();

    assert_eq!(outcome, RelayOutcome::Rejected);
    assert_eq!(
        client.sent(),
        vec![Sent::Direct(UserId(300), NOT_A_MEMBER.to_string())]
    );
}

#[tokio::test]
async fn test_reply_command_messages_member() {
    let (relay, client) = setup();
    let outcome = relay
        .on_message(in_input(moderator(), "!reply <@!200> Friday at noon"))
        .await
        .unwrap();

    assert_eq!(outcome, RelayOutcome::Command);
    assert_eq!(
        client.sent(),
        vec![Sent::Direct(
            UserId(200),
            "Moderator Mo replied:\nFriday at noon".to_string()
        )]
    );
}

#[tokio::test]
async fn test_reply_is_case_insensitive() {
    let (relay, client) = setup();
    relay
        .on_message(in_input(moderator(), "!REPLY <@200> ok"))
        .await
        .unwrap();
    assert_eq!(
        client.sent(),
        vec![Sent::Direct(UserId(200), "Moderator Mo replied:\nok".to_string())]
    );
}

#[tokio::test]
async fn test_reply_without_mention_explains_usage() {
    let (relay, client) = setup();
    relay
        .on_message(in_input(moderator(), "!reply steve hi"))
        .await
        .unwrap();
    assert_eq!(
        client.sent(),
        vec![Sent::Channel(
            INPUT,
            "Error: Mention the user to reply to, e.g. `reply @steve Hello`".to_string()
        )]
    );
}

#[tokio::test]
async fn test_reply_to_unknown_or_empty_is_silent() {
    let (relay, client) = setup();
    relay
        .on_message(in_input(moderator(), "!reply <@!999> hello"))
        .await
        .unwrap();
    relay
        .on_message(in_input(moderator(), "!reply <@!200>   "))
        .await
        .unwrap();
    assert!(client.sent().is_empty());
}

#[tokio::test]
async fn test_send_command_posts_to_output() {
    let (relay, client) = setup();
    relay
        .on_message(in_input(moderator(), "!send Slides are up"))
        .await
        .unwrap();
    assert_eq!(
        client.sent(),
        vec![Sent::Channel(OUTPUT, "Slides are up".to_string())]
    );
}

#[tokio::test]
async fn test_send_without_text_explains_usage() {
    let (relay, client) = setup();
    relay.on_message(in_input(moderator(), "!send")).await.unwrap();
    relay
        .on_message(in_input(moderator(), "!send   "))
        .await
        .unwrap();

    let usage = "Error: Nothing to send, e.g. `send The answers are now posted!`".to_string();
    assert_eq!(
        client.sent(),
        vec![Sent::Channel(INPUT, usage.clone()), Sent::Channel(INPUT, usage)]
    );
}

#[tokio::test]
async fn test_reply_to_oversized_mention_id_is_user_error() {
    let (relay, client) = setup();
    relay
        .on_message(in_input(moderator(), "!reply <@99999999999999999999999> hi"))
        .await
        .unwrap();
    assert_eq!(
        client.sent(),
        vec![Sent::Channel(
            INPUT,
            "Error: That mention does not name a valid user".to_string()
        )]
    );
}

#[tokio::test]
async fn test_delivery_failure_is_reported() {
    let client = Arc::new(RecordingClient::new().with_member(moderator()).offline());
    let relay = Relay::new(Arc::new(build_commands().unwrap()), client.clone(), settings());

    let err = relay
        .on_message(in_input(moderator(), "!send Slides are up"))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Delivery(_)));
    assert!(client.sent().is_empty());
}

#[tokio::test]
async fn test_unknown_command_reply() {
    let (relay, client) = setup();
    relay
        .on_message(in_input(moderator(), "!dance"))
        .await
        .unwrap();
    assert_eq!(
        client.sent(),
        vec![Sent::Channel(
            INPUT,
            "Unknown command. Use \"help\" to get a list of commands.".to_string()
        )]
    );
}

#[tokio::test]
async fn test_help_lists_commands() {
    let (relay, client) = setup();
    relay.on_message(in_input(moderator(), "!Help")).await.unwrap();

    let sent = client.sent();
    assert_eq!(sent.len(), 1);
    let Sent::Channel(channel, text) = &sent[0] else {
        panic!("expected a channel message, got {:?}", sent[0]);
    };
    assert_eq!(*channel, INPUT);
    assert!(text.starts_with("Showing help:"));
    assert!(text.contains("`reply`: Reply to a user's message using `reply @USER ...`"));
    assert!(text.contains("`send`: Send a message to the output channel using `send ...`"));
    assert!(text.ends_with("To learn more about a command, use `help <command>`"));
}

#[tokio::test]
async fn test_help_for_single_command() {
    let (relay, client) = setup();
    relay
        .on_message(in_input(moderator(), "!help reply"))
        .await
        .unwrap();
    assert_eq!(
        client.sent(),
        vec![Sent::Channel(
            INPUT,
            "Reply to a user's message using `reply @USER ...`\nE.g: `reply @steve Hello world!`"
                .to_string()
        )]
    );
}

#[tokio::test]
async fn test_custom_permission_gated_group() {
    let client = Arc::new(RecordingClient::new().with_member(moderator()));
    let mut commands = build_commands().unwrap();
    commands
        .add_command_group(
            "admin",
            GroupOptions::new()
                .summary("Moderator tools")
                .check_perms(|ctx: &relay_bot::BotContext| ctx.message.author.id == UserId(100)),
        )
        .unwrap()
        .add_command(
            "ping",
            Command::from_fn(|ctx: relay_bot::BotContext, _: Args| {
                format!("pong for {}", ctx.message.author.display_name())
            }),
        )
        .unwrap();
    let relay = Relay::new(Arc::new(commands), client.clone(), settings());

    relay
        .on_message(in_input(moderator(), "!admin ping"))
        .await
        .unwrap();
    relay
        .on_message(in_input(student(), "!admin ping"))
        .await
        .unwrap();

    assert_eq!(
        client.sent(),
        vec![
            Sent::Channel(INPUT, "pong for Moderator Mo".to_string()),
            Sent::Channel(
                INPUT,
                "Error insufficient permissions for this command.".to_string()
            ),
        ]
    );
}
