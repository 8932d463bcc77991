//! Interactive terminal loop.
//!
//! Input is read on a blocking rustyline thread and forwarded over a channel.
//! Gateway calls run on spawned tasks and report back over a second channel,
//! so the loop keeps accepting input while a request is in flight and the
//! session decides what to do with it.

use std::{io::Write, sync::Arc, time::Duration};

use lpbd_shared::time::SystemClock;
use rustyline::{DefaultEditor, error::ReadlineError};
use tokio::sync::mpsc;

use crate::{
    config::ClientConfig,
    domain::{Event, IdentityStore, Intent, Notice, NoticeLevel, PersonaBar, Render, Scene},
    error::ClientError,
    infrastructure::{gateway::HttpBarGateway, identity::FileIdentityStore},
    usecase::{InteractionController, perform},
};

use super::{
    command::{UserCommand, parse_command},
    formatter::{CharBand, MessageFormatter},
    renderer::TerminalRenderer,
};

const TICK_INTERVAL: Duration = Duration::from_millis(500);
const PROMPT: &str = "> ";

/// What the loop should do with one line of input.
#[derive(Debug, PartialEq)]
pub enum Step {
    Quit,
    /// Needs the renderer for the notice still on screen.
    Status,
    Print(String),
    Intents(Vec<Intent>),
}

/// Run the client until the visitor quits or input closes.
pub async fn run_client(config: ClientConfig, reset_identity: bool) -> Result<(), ClientError> {
    let gateway = Arc::new(HttpBarGateway::new(&config)?);
    let identity = Arc::new(FileIdentityStore::new(config.identity_file.clone()));
    if reset_identity {
        tracing::info!("Forgetting stored identity at {}", identity.path().display());
        identity.forget()?;
    }

    let mut controller = InteractionController::new(gateway, identity)?;
    let mut renderer = TerminalRenderer::new(std::io::stdout(), Arc::new(SystemClock));

    tracing::info!("Talking to {}", config.base_url);
    renderer.apply(&Intent::Render(Render::Scene(Scene::Exterior)))?;
    renderer.print(&format!(
        "\nType /knock to get the bouncer's attention.\n{}",
        MessageFormatter::format_help()
    ))?;

    let (input_tx, input_rx) = mpsc::unbounded_channel::<String>();
    spawn_readline(input_tx);

    drive(&mut controller, &mut renderer, input_rx).await
}

/// Forward every typed line, blank ones included, until Ctrl+C or Ctrl+D.
fn spawn_readline(input_tx: mpsc::UnboundedSender<String>) {
    std::thread::spawn(move || {
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => rl,
            Err(e) => {
                tracing::error!("Failed to initialize readline: {}", e);
                return;
            }
        };

        loop {
            match rl.readline(PROMPT) {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        rl.add_history_entry(line.as_str()).ok();
                    }
                    if input_tx.send(line).is_err() {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    tracing::info!("Interrupted");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    tracing::info!("EOF");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {}", err);
                    break;
                }
            }
        }
    });
}

/// The event loop: typed lines, finished gateway calls and notice expiry.
pub async fn drive<W: Write>(
    controller: &mut InteractionController,
    renderer: &mut TerminalRenderer<W>,
    mut input_rx: mpsc::UnboundedReceiver<String>,
) -> Result<(), ClientError> {
    let (done_tx, mut done_rx) = mpsc::unbounded_channel::<Event>();
    let mut ticker = tokio::time::interval(TICK_INTERVAL);

    loop {
        tokio::select! {
            biased;

            Some(event) = done_rx.recv() => {
                let intents = controller.dispatch(event);
                emit(controller, renderer, intents, &done_tx)?;
            }
            line = input_rx.recv() => {
                let Some(line) = line else {
                    tracing::info!("Input closed");
                    break;
                };
                for step in handle_line(controller, &line) {
                    match step {
                        Step::Quit => {
                            renderer.print("Goodnight.\n")?;
                            return Ok(());
                        }
                        Step::Status => {
                            let status = MessageFormatter::format_status(
                                controller.session(),
                                renderer.current_notice(),
                            );
                            renderer.print(&status)?;
                        }
                        Step::Print(text) => renderer.print(&text)?,
                        Step::Intents(intents) => emit(controller, renderer, intents, &done_tx)?,
                    }
                }
            }
            _ = ticker.tick() => renderer.tick(),
        }
    }

    Ok(())
}

/// Render intents and hand calls to background tasks.
fn emit<W: Write>(
    controller: &InteractionController,
    renderer: &mut TerminalRenderer<W>,
    intents: Vec<Intent>,
    done_tx: &mpsc::UnboundedSender<Event>,
) -> std::io::Result<()> {
    let mut shown = Vec::with_capacity(intents.len());
    for intent in intents {
        match intent {
            Intent::Call(call) => {
                let gateway = controller.gateway();
                let done_tx = done_tx.clone();
                tokio::spawn(async move {
                    let event = perform(gateway.as_ref(), call).await;
                    if done_tx.send(event).is_err() {
                        tracing::debug!("Loop exited before a call finished");
                    }
                });
            }
            other => shown.push(other),
        }
    }
    if shown.is_empty() {
        return Ok(());
    }
    renderer.apply_all(&shown)
}

/// Turn one typed line into loop steps.
pub fn handle_line(controller: &mut InteractionController, line: &str) -> Vec<Step> {
    let command = match parse_command(line) {
        Ok(command) => command,
        Err(e) => return vec![warning(e.to_string())],
    };

    match command {
        UserCommand::Quit => vec![Step::Quit],
        UserCommand::Help => vec![Step::Print(MessageFormatter::format_help())],
        UserCommand::Status => vec![Step::Status],
        UserCommand::Personas => vec![Step::Intents(vec![Intent::Render(Render::Personas(
            PersonaBar::of(controller.session()),
        ))])],
        UserCommand::Knock => vec![Step::Intents(controller.dispatch(Event::KnockRequested))],
        UserCommand::Enter => vec![Step::Intents(controller.dispatch(Event::EnterRequested))],
        UserCommand::Select(persona) => vec![Step::Intents(controller.select_persona(persona))],
        UserCommand::Deselect => vec![Step::Intents(controller.deselect_persona())],
        UserCommand::Reset => match controller.reset_client_identity() {
            Ok(intents) => vec![Step::Intents(intents)],
            Err(e) => {
                tracing::error!("Identity reset failed: {}", e);
                vec![Step::Intents(vec![Intent::Notify(Notice::new(
                    NoticeLevel::Error,
                    format!("Could not reset identity: {}", e),
                ))])]
            }
        },
        UserCommand::Say(text) => {
            let mut steps = Vec::new();
            let len = text.trim().chars().count();
            if CharBand::for_len(len) != CharBand::Normal {
                steps.push(Step::Print(MessageFormatter::format_char_count(len)));
            }
            let event = controller.event_for_text(&text);
            steps.push(Step::Intents(controller.dispatch(event)));
            steps
        }
    }
}

fn warning(text: String) -> Step {
    Step::Intents(vec![Intent::Notify(Notice::new(NoticeLevel::Warning, text))])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{
            AnonymousId, ApiCall, OnboardingVerdict, Phase, ValidationError,
            gateway::MockBarGateway,
        },
        infrastructure::identity::InMemoryIdentityStore,
    };
    use lpbd_shared::time::FixedClock;

    fn controller(mock: MockBarGateway) -> InteractionController {
        InteractionController::new(
            Arc::new(mock),
            Arc::new(InMemoryIdentityStore::with_identity(
                AnonymousId::new("visitor-1".to_string()).unwrap(),
            )),
        )
        .unwrap()
    }

    #[test]
    fn test_quit_and_help() {
        // テスト項目: /quit は終了、/help はヘルプ表示になる
        // given (前提条件):
        let mut controller = controller(MockBarGateway::new());

        // when (操作):
        let quit = handle_line(&mut controller, "/quit");
        let help = handle_line(&mut controller, "/help");

        // then (期待する結果):
        assert_eq!(quit, vec![Step::Quit]);
        assert_eq!(help, vec![Step::Print(MessageFormatter::format_help())]);
    }

    #[test]
    fn test_knock_emits_onboarding_call() {
        // テスト項目: /knock はオンボーディング開始の呼び出しを生成する
        // given (前提条件):
        let mut controller = controller(MockBarGateway::new());

        // when (操作):
        let steps = handle_line(&mut controller, "/knock");

        // then (期待する結果):
        let [Step::Intents(intents)] = steps.as_slice() else {
            panic!("unexpected steps: {:?}", steps);
        };
        assert!(
            intents
                .iter()
                .any(|i| matches!(i, Intent::Call(ApiCall::Onboard(r)) if r.message.is_none()))
        );
        assert!(controller.session().onboarding_in_progress());
    }

    #[test]
    fn test_unknown_command_is_a_warning() {
        // テスト項目: 未知のコマンドは警告通知になる
        // given (前提条件):
        let mut controller = controller(MockBarGateway::new());

        // when (操作):
        let steps = handle_line(&mut controller, "/dance");

        // then (期待する結果):
        assert_eq!(
            steps,
            vec![Step::Intents(vec![Intent::Notify(Notice::new(
                NoticeLevel::Warning,
                "Unknown command '/dance'. Type /help for the list."
            ))])]
        );
    }

    #[test]
    fn test_blank_line_warns() {
        // テスト項目: 空行はメッセージ入力を促す警告になる
        // given (前提条件):
        let mut controller = controller(MockBarGateway::new());
        handle_line(&mut controller, "/knock");
        controller.dispatch(Event::OnboardingAnswered(OnboardingVerdict {
            message: "Why are you here?".to_string(),
            approved: false,
            continue_onboarding: true,
        }));

        // when (操作):
        let steps = handle_line(&mut controller, "   ");

        // then (期待する結果):
        assert_eq!(
            steps,
            vec![Step::Intents(vec![Intent::Notify(Notice::new(
                NoticeLevel::Warning,
                ValidationError::EmptyMessage.to_string()
            ))])]
        );
    }

    #[test]
    fn test_long_text_shows_char_count() {
        // テスト項目: 400 文字を超える入力では文字数が表示される
        // given (前提条件):
        let mut controller = controller(MockBarGateway::new());
        let text = "a".repeat(420);

        // when (操作):
        let steps = handle_line(&mut controller, &text);

        // then (期待する結果):
        assert_eq!(steps[0], Step::Print(MessageFormatter::format_char_count(420)));
    }

    #[tokio::test]
    async fn test_status_shows_notice_until_dismissed() {
        // テスト項目: /status は表示中の通知を含み、自動消去後は含まない
        // given (前提条件):
        let mut controller = controller(MockBarGateway::new());
        let clock = Arc::new(FixedClock::new(0));
        let mut renderer = TerminalRenderer::new(Vec::new(), clock.clone());
        let (input_tx, input_rx) = mpsc::unbounded_channel();
        input_tx.send("/select bart".to_string()).unwrap();
        input_tx.send("/status".to_string()).unwrap();
        drop(input_tx);
        drive(&mut controller, &mut renderer, input_rx).await.unwrap();
        let before = String::from_utf8(renderer.into_inner()).unwrap();

        // when (操作):
        let mut renderer = TerminalRenderer::new(Vec::new(), clock.clone());
        let (input_tx, input_rx) = mpsc::unbounded_channel();
        input_tx.send("/select bernie".to_string()).unwrap();
        drop(input_tx);
        drive(&mut controller, &mut renderer, input_rx).await.unwrap();
        clock.advance(crate::ui::notice::NOTICE_TTL_MILLIS);
        renderer.tick();
        let (input_tx, input_rx) = mpsc::unbounded_channel();
        input_tx.send("/status".to_string()).unwrap();
        drop(input_tx);
        drive(&mut controller, &mut renderer, input_rx).await.unwrap();
        let after = String::from_utf8(renderer.into_inner()).unwrap();

        // then (期待する結果):
        assert!(before.contains("Notice: Selected: BART"));
        assert!(after.contains("Talking to: BERNIE"));
        assert!(!after.contains("Notice:"));
    }

    #[tokio::test]
    async fn test_drive_runs_calls_in_background() {
        // テスト項目: ループがゲートウェイ呼び出しを実行し結果を描画する
        // given (前提条件):
        let mut mock = MockBarGateway::new();
        mock.expect_onboard().times(1).returning(|_| {
            Ok(OnboardingVerdict {
                message: "Why are you here?".to_string(),
                approved: false,
                continue_onboarding: true,
            })
        });
        let mut controller = controller(mock);
        let mut renderer = TerminalRenderer::new(Vec::new(), Arc::new(FixedClock::new(0)));
        let (input_tx, input_rx) = mpsc::unbounded_channel();

        // when (操作):
        let feed = async move {
            input_tx.send("/knock".to_string()).unwrap();
            tokio::time::sleep(Duration::from_millis(100)).await;
            drop(input_tx);
        };
        let (result, ()) = tokio::join!(drive(&mut controller, &mut renderer, input_rx), feed);

        // then (期待する結果):
        assert!(result.is_ok());
        assert_eq!(
            controller.session().phase,
            Phase::Onboarding {
                turn: crate::domain::OnboardingTurn::AwaitingReply
            }
        );
        let output = String::from_utf8(renderer.into_inner()).unwrap();
        assert!(output.contains("[BOUNCER] Why are you here?"));
    }
}
