use std::sync::Arc;

use serde_json::Value;
use tokio::io::{AsyncBufReadExt, BufReader};

use fitness_intake::api::{BackendClient, GenerateWorkoutRequest, WorkoutGenerator};
use fitness_intake::config::ClientConfig;
use fitness_intake::conversation::{
    ControllerDeps, ConversationController, Profile, Selections, Stage, StageForm, TurnOutcome,
};
use fitness_intake::error::Result;
use fitness_intake::voice::ClipFileMicrophone;
use fitness_intake::workout::{PlanRenderer, WorkoutDocument};

/// Prints plans to stdout.
struct StdoutRenderer;

impl PlanRenderer for StdoutRenderer {
    fn render(&self, plan: &WorkoutDocument) {
        println!("\n{}\n", plan.to_display_text());
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = match ClientConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("  export FITNESS_API_URL=http://localhost:8000");
            std::process::exit(1);
        }
    };

    eprintln!("🏋️ Fitness Intake v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Backend: {}", config.api_base_url);
    eprintln!("   Timeout: {}s", config.request_timeout.as_secs());
    eprintln!("   Answer with key=value pairs separated by ';' (lists: a,b,c).");
    eprintln!(
        "   Commands: /record <clip>, /stop, /accept, /edit, /discard, /profile, /generate, /quit\n"
    );

    let client = connect(&config)?;
    let microphone = Arc::new(ClipFileMicrophone::new(config.audio_mime.clone()));
    let renderer = Arc::new(StdoutRenderer);

    let controller = ConversationController::new(ControllerDeps {
        backend: client.clone(),
        transcriber: client.clone(),
        microphone: microphone.clone(),
        renderer: renderer.clone(),
    });

    if let Err(e) = controller.start().await {
        eprintln!("⚠️  {e}");
    }
    let mut shown = print_new_messages(&controller, 0).await;
    prompt(&controller).await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line.trim().to_string(),
            Ok(None) => break,
            Err(e) => {
                tracing::error!("Error reading stdin: {}", e);
                break;
            }
        };
        if line.is_empty() {
            prompt(&controller).await;
            continue;
        }

        let (command, arg) = match line.split_once(' ') {
            Some((c, a)) => (c, a.trim()),
            None => (line.as_str(), ""),
        };

        match command {
            "/quit" | "/exit" => break,
            "/record" => {
                if arg.is_empty() {
                    eprintln!("Usage: /record <path to audio clip>");
                } else {
                    microphone.load(arg);
                    match controller.start_recording().await {
                        Ok(true) => eprintln!("🎙️ Recording... /stop when done"),
                        Ok(false) => eprintln!("Already recording."),
                        Err(e) => eprintln!("⚠️  {e}. You can still type your answers."),
                    }
                }
            }
            "/stop" => match controller.stop_recording().await {
                Ok(Some(draft)) => {
                    eprintln!("📝 Heard: {}", draft.transcript);
                    eprintln!("   Selections: {}", Value::Object(draft.selections));
                    if !draft.missing.is_empty() {
                        eprintln!("   Still missing: {}", draft.missing.join(", "));
                    }
                    eprintln!("   /accept to submit, /edit to revise as a form, /discard to drop");
                }
                Ok(None) => eprintln!("Not recording."),
                Err(e) => eprintln!("⚠️  {e}. Try recording again."),
            },
            "/accept" => match controller.accept_draft().await {
                Ok(outcome) => report(&outcome),
                Err(e) => eprintln!("⚠️  {e}"),
            },
            "/edit" => match controller.draft_form().await {
                Some(Ok(form)) => {
                    eprintln!("Edit and send this line to submit it as a form:");
                    println!("{}", form_line(&form));
                }
                Some(Err(e)) => eprintln!("⚠️  {e}. Fill in the rest as key=value pairs."),
                None => eprintln!("No draft to edit."),
            },
            "/discard" => {
                if controller.discard_draft().await {
                    eprintln!("Draft discarded.");
                } else {
                    eprintln!("No draft to discard.");
                }
            }
            "/profile" => {
                let profile = controller.profile().await;
                match serde_json::to_string_pretty(&profile) {
                    Ok(json) => println!("{json}"),
                    Err(e) => eprintln!("⚠️  {e}"),
                }
            }
            "/generate" => {
                let profile = controller.profile().await;
                match generate(&client, &config.user_id, &profile).await {
                    Ok(plan) => renderer.render(&plan),
                    Err(e) => eprintln!("⚠️  {e}"),
                }
            }
            _ if command.starts_with('/') => eprintln!("Unknown command: {command}"),
            _ => {
                let target = match parse_stage_prefix(&line) {
                    Some(target) => Some(target),
                    None => match controller.stage().await {
                        stage if stage.is_terminal() => {
                            eprintln!(
                                "The plan is ready. To revise, prefix a stage, e.g. goals: goals=strength"
                            );
                            None
                        }
                        stage => Some((stage, line.as_str())),
                    },
                };
                if let Some((stage, body)) = target {
                    match StageForm::from_selections(stage, &parse_pairs(body)) {
                        Ok(form) => match controller.submit_form(form).await {
                            Ok(outcome) => report(&outcome),
                            Err(e) => eprintln!("⚠️  {e}"),
                        },
                        Err(e) => eprintln!("⚠️  {e}"),
                    }
                }
            }
        }

        shown = print_new_messages(&controller, shown).await;
        prompt(&controller).await;
    }

    Ok(())
}

fn connect(config: &ClientConfig) -> Result<Arc<BackendClient>> {
    Ok(Arc::new(BackendClient::new(config.clone())?))
}

async fn generate(client: &BackendClient, user_id: &str, profile: &Profile) -> Result<WorkoutDocument> {
    let request = GenerateWorkoutRequest::from_profile(user_id, profile)?;
    Ok(client.generate_workout(&request).await?)
}

/// A form as a `stage: key=value; ...` line the input parser accepts.
fn form_line(form: &StageForm) -> String {
    let pairs: Vec<String> = form
        .selections()
        .into_iter()
        .filter_map(|(key, value)| {
            let text = match value {
                Value::String(s) => s,
                Value::Array(items) => items
                    .iter()
                    .filter_map(|v| v.as_str().map(String::from))
                    .collect::<Vec<_>>()
                    .join(","),
                Value::Null => return None,
                other => other.to_string(),
            };
            (!text.is_empty()).then(|| format!("{key}={text}"))
        })
        .collect();
    format!("{}: {}", form.stage(), pairs.join("; "))
}

async fn print_new_messages(controller: &ConversationController, shown: usize) -> usize {
    let messages = controller.messages().await;
    for message in messages.iter().skip(shown).filter(|m| !m.is_user) {
        println!("\n{}\n", message.text);
    }
    messages.len()
}

async fn prompt(controller: &ConversationController) {
    eprint!("[{}] > ", controller.stage().await);
}

fn report(outcome: &TurnOutcome) {
    match outcome {
        TurnOutcome::Advanced(_) => {}
        TurnOutcome::Completed => eprintln!("✅ Plan generated."),
        TurnOutcome::Failed(e) => tracing::debug!(error = %e, "Turn failed"),
    }
}

/// `goals: goals=strength` targets a stage other than the active one.
fn parse_stage_prefix(line: &str) -> Option<(Stage, &str)> {
    let (head, rest) = line.split_once(':')?;
    let stage = match head.trim() {
        "basic" => Stage::Basic,
        "goals" => Stage::Goals,
        "final" => Stage::Final,
        _ => return None,
    };
    Some((stage, rest.trim()))
}

/// `age=30; goals=strength,endurance` into selections. Values with commas
/// become lists; everything else is left as a string for the profile merge
/// to coerce.
fn parse_pairs(body: &str) -> Selections {
    let mut selections = Selections::new();
    for pair in body.split(';') {
        let Some((key, value)) = pair.split_once('=') else {
            continue;
        };
        let key = key.trim();
        let value = value.trim();
        if key.is_empty() || value.is_empty() {
            continue;
        }
        let value = if value.contains(',') {
            Value::Array(
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .map(|v| Value::String(v.to_string()))
                    .collect(),
            )
        } else {
            Value::String(value.to_string())
        };
        selections.insert(key.to_string(), value);
    }
    selections
}
