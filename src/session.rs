//! 対話式の撮影セッション
//!
//! WorkflowController を端末上で1サイクル回す。
//! 名前や「手放す」が引数で与えられていれば問い合わせずに進める。

use crate::capture::{CaptureDevice, FolderCamera};
use crate::classifier::{Classifier, DemoClassifier, HttpClassifier};
use crate::collection::{CollectionStore, JsonCollectionStore};
use crate::config::Config;
use crate::workflow::{GuideOrder, Step, WorkflowController, WorkflowError};
use anyhow::{anyhow, bail, Context, Result};
use dialoguer::{Confirm, Input};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;

/// セッションの実行オプション
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub source: PathBuf,
    pub name: Option<String>,
    pub release: bool,
    pub demo: bool,
    pub order: GuideOrder,
}

impl SessionOptions {
    fn is_scripted(&self) -> bool {
        self.name.is_some() || self.release
    }
}

/// セッションの最終結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    Saved { id: u64, name: String },
    Released,
}

pub async fn run_capture_session(config: &Config, opts: &SessionOptions) -> Result<SessionOutcome> {
    let data_dir = config.data_dir()?;
    let store = JsonCollectionStore::open(&data_dir)
        .with_context(|| format!("도감을 열 수 없어요: {}", data_dir.display()))?;

    let mut camera = FolderCamera::new(&opts.source).with_max_edge(config.max_image_size);
    if let Some(viewport) = config.viewport {
        camera = camera.with_viewport(viewport.width, viewport.height);
    }

    if opts.demo || config.demo_mode {
        println!("🎲 데모 모드: 서버 없이 임의의 몬스터가 나와요\n");
        let controller = WorkflowController::new(DemoClassifier::new(), store, camera, opts.order);
        drive(controller, opts).await
    } else {
        let classifier = HttpClassifier::new(&config.effective_api_url(), config.timeout_seconds)?;
        let controller = WorkflowController::new(classifier, store, camera, opts.order);
        drive(controller, opts).await
    }
}

async fn drive<C, S, D>(mut controller: WorkflowController<C, S, D>, opts: &SessionOptions) -> Result<SessionOutcome>
where
    C: Classifier,
    S: CollectionStore,
    D: CaptureDevice,
{
    if controller.start()? == Step::Error {
        return Err(error_exit(&controller));
    }

    let spinner = loading_spinner();
    let step = controller.capture().await?;
    spinner.finish_and_clear();
    if step == Step::Error {
        return Err(error_exit(&controller));
    }

    loop {
        match controller.step() {
            Step::Intro => {
                if let Some(result) = controller.pending_result() {
                    println!("✨ 새로운 친구를 발견했어요! [{}]", result.category);
                }
                controller.start_guide()?;
            }
            Step::Guide => {
                let guide = controller.guide().ok_or_else(|| anyhow!("가이드가 없어요"))?;
                let cursor = controller.state().tip_cursor;
                if cursor == 0 {
                    println!("\n🌱 {} 분리수거 방법: {}", guide.category, guide.message);
                }
                if let Some(tip) = controller.current_tip() {
                    println!("  ✔️ {}", tip);
                }
                if !opts.is_scripted() {
                    let label = if cursor + 1 < guide.tips.len() { "다음" } else { "완료" };
                    Confirm::new().with_prompt(label).default(true).interact()?;
                }
                controller.next_tip()?;
                persistence_guard(&controller, opts)?;
            }
            Step::Naming => {
                print_naming_header(&controller);
                if opts.release {
                    controller.release()?;
                    println!("🌿 놓아주었어요");
                    return Ok(SessionOutcome::Released);
                }

                let name = match &opts.name {
                    Some(name) => name.clone(),
                    None => {
                        let keep = Confirm::new()
                            .with_prompt("도감에 넣을까요? (아니요: 놓아주기)")
                            .default(true)
                            .interact()?;
                        if !keep {
                            controller.release()?;
                            println!("🌿 놓아주었어요");
                            return Ok(SessionOutcome::Released);
                        }
                        Input::<String>::new()
                            .with_prompt("이름을 지어주세요")
                            .with_initial_text(controller.state().draft_name.clone())
                            .interact_text()?
                    }
                };

                match controller.submit_name(&name) {
                    Ok(_) => {}
                    Err(WorkflowError::InvalidName(e)) if !opts.is_scripted() => {
                        println!("  ⚠️ {}", e);
                        continue;
                    }
                    Err(e) => return Err(e.into()),
                }
                persistence_guard(&controller, opts)?;
            }
            Step::Complete => {
                let state = controller.state();
                let id = state.committed_id.ok_or_else(|| anyhow!("저장 ID가 없어요"))?;
                println!("\n🎉 {} 도감에 등록되었어요! (#{})", state.draft_name, id);
                return Ok(SessionOutcome::Saved {
                    id,
                    name: state.draft_name.clone(),
                });
            }
            Step::Error => return Err(error_exit(&controller)),
            step @ (Step::Idle | Step::Loading) => bail!("예상하지 못한 단계: {}", step),
        }
    }
}

/// 保存に失敗したまま同じ段階に留まった場合の扱い
///
/// 対話モードでは再入力させ、スクリプトモードではエラーで終える。
fn persistence_guard<C, S, D>(controller: &WorkflowController<C, S, D>, opts: &SessionOptions) -> Result<()>
where
    C: Classifier,
    S: CollectionStore,
    D: CaptureDevice,
{
    let Some(err) = &controller.state().last_error else {
        return Ok(());
    };
    if controller.step() == Step::Complete || controller.step() == Step::Error {
        return Ok(());
    }
    println!("  ⚠️ {}", err.user_message());
    if opts.is_scripted() {
        bail!("{}", err);
    }
    Ok(())
}

fn print_naming_header<C, S, D>(controller: &WorkflowController<C, S, D>)
where
    C: Classifier,
    S: CollectionStore,
    D: CaptureDevice,
{
    let state = controller.state();
    if let (Some(result), Some(rank)) = (&state.pending_result, state.draft_rank) {
        println!("\n[{}] {} Rank", result.category, rank);
    }
}

fn error_exit<C, S, D>(controller: &WorkflowController<C, S, D>) -> anyhow::Error
where
    C: Classifier,
    S: CollectionStore,
    D: CaptureDevice,
{
    match &controller.state().last_error {
        Some(err) => {
            println!("😢 {}", err.user_message());
            anyhow!("{}", err)
        }
        None => anyhow!("알 수 없는 오류"),
    }
}

fn loading_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message("🎨 몬스터를 만드는 중이에요... (10~20초 정도 걸려요)");
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner
}
