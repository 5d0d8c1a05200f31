//! 撮影 → 分類 → 命名 → 保存 のワークフロー制御
//!
//! 状態遷移:
//! - idle --capture--> loading
//! - loading --成功--> intro (GuideFirst) / naming (NameFirst)
//! - loading --失敗--> error
//! - intro --start_guide--> guide
//! - guide --next_tip--> guide / naming (GuideFirst) / complete (NameFirst)
//! - naming --submit_name--> complete (GuideFirst) / guide (NameFirst)
//! - naming --release--> idle
//! - complete --capture_again--> idle, error --retry--> idle
//!
//! 図鑑への保存は1セッションにつき最大1回、名前確定後にのみ行う。

use super::state::{GuideOrder, SessionError, Step, WorkflowState};
use crate::capture::{CaptureDevice, CapturedImage};
use crate::classifier::{Classifier, ClassifyError};
use crate::collection::CollectionStore;
use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use thiserror::Error;
use tracing::{debug, info, warn};
use trashmon_common::{
    clamp_monster_name, default_monster_name, guide_for, validate_monster_name,
    ClassificationResult, Guide, NewCollectionItem, Rank,
};

#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error("'{action}' 는 {step} 단계에서 할 수 없어요")]
    InvalidTransition { step: Step, action: &'static str },

    #[error("이름이 올바르지 않아요: {0}")]
    InvalidName(#[source] trashmon_common::Error),
}

/// 分類リクエストの受付票
///
/// 結果が戻る前にセッションがリセットされた場合、古い受付票の結果は捨てる。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassificationTicket {
    session: u64,
}

pub struct WorkflowController<C, S, D> {
    classifier: C,
    store: S,
    device: D,
    order: GuideOrder,
    rng: StdRng,
    state: WorkflowState,
    captured_image: Option<CapturedImage>,
    session: u64,
}

impl<C, S, D> WorkflowController<C, S, D>
where
    C: Classifier,
    S: CollectionStore,
    D: CaptureDevice,
{
    pub fn new(classifier: C, store: S, device: D, order: GuideOrder) -> Self {
        Self {
            classifier,
            store,
            device,
            order,
            rng: StdRng::from_entropy(),
            state: WorkflowState::default(),
            captured_image: None,
            session: 0,
        }
    }

    /// ランク抽選の乱数を固定する
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    pub fn step(&self) -> Step {
        self.state.step
    }

    pub fn order(&self) -> GuideOrder {
        self.order
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    pub fn captured_image(&self) -> Option<&CapturedImage> {
        self.captured_image.as_ref()
    }

    pub fn pending_result(&self) -> Option<&ClassificationResult> {
        self.state.pending_result.as_ref()
    }

    /// 分類済みカテゴリのガイド
    pub fn guide(&self) -> Option<&'static Guide> {
        self.state.pending_result.as_ref().map(|r| guide_for(r.category))
    }

    pub fn current_tip(&self) -> Option<&'static str> {
        self.guide()
            .and_then(|g| g.tips.get(self.state.tip_cursor))
            .copied()
    }

    fn expect_step(&self, expected: Step, action: &'static str) -> Result<(), WorkflowError> {
        if self.state.step == expected {
            Ok(())
        } else {
            Err(WorkflowError::InvalidTransition {
                step: self.state.step,
                action,
            })
        }
    }

    fn transition(&mut self, to: Step) -> Step {
        debug!(from = %self.state.step, to = %to, "workflow transition");
        self.state.step = to;
        to
    }

    fn fail(&mut self, err: SessionError) -> Step {
        warn!(error = %err, "workflow entered error state");
        self.state.last_error = Some(err);
        self.transition(Step::Error)
    }

    /// カメラを起動する（idle のみ）
    pub fn start(&mut self) -> Result<Step, WorkflowError> {
        self.expect_step(Step::Idle, "start")?;
        Ok(self.ensure_device_running())
    }

    fn ensure_device_running(&mut self) -> Step {
        if self.device.is_running() {
            return self.state.step;
        }
        match self.device.start() {
            Ok(()) => self.state.step,
            Err(e) => self.fail(SessionError::Device(e)),
        }
    }

    /// カメラから1枚撮影して分類する
    pub async fn capture(&mut self) -> Result<Step, WorkflowError> {
        self.expect_step(Step::Idle, "capture")?;

        let image = match self.device.capture_frame() {
            Ok(image) => image,
            Err(e) => return Ok(self.fail(SessionError::Device(e))),
        };
        // 撮影後はプレビューを止める。解放できなければ分類へ進まない
        if let Err(e) = self.device.stop() {
            warn!("failed to stop camera after capture: {}", e);
            return Ok(self.fail(SessionError::Device(e)));
        }

        self.submit_image(image).await
    }

    /// 撮影済み画像を分類する
    pub async fn submit_image(&mut self, image: CapturedImage) -> Result<Step, WorkflowError> {
        let ticket = self.begin_classification(image)?;
        let outcome = match self.captured_image.as_ref() {
            Some(image) => self.classifier.classify(image).await,
            None => Err(ClassifyError::Failed("captured image missing".into())),
        };
        Ok(self.resolve_classification(ticket, outcome))
    }

    /// idle → loading。前回セッションの結果・名前・カーソル・エラーを消してから受け付ける
    ///
    /// loading 中の再撮影は受け付けない。
    pub fn begin_classification(&mut self, image: CapturedImage) -> Result<ClassificationTicket, WorkflowError> {
        self.expect_step(Step::Idle, "capture")?;

        self.state.reset();
        self.session += 1;
        self.state.captured_image_handle = Some(image.digest.clone());
        self.captured_image = Some(image);
        self.transition(Step::Loading);

        info!(session = self.session, classifier = self.classifier.name(), "classification started");
        Ok(ClassificationTicket {
            session: self.session,
        })
    }

    /// 分類結果を反映する。セッションが変わっていれば結果は捨てる
    pub fn resolve_classification(
        &mut self,
        ticket: ClassificationTicket,
        outcome: Result<ClassificationResult, ClassifyError>,
    ) -> Step {
        if ticket.session != self.session || self.state.step != Step::Loading {
            debug!(
                ticket = ticket.session,
                current = self.session,
                "discarding stale classification result"
            );
            return self.state.step;
        }

        let result = match outcome {
            Ok(result) => result,
            Err(e) => return self.fail(SessionError::from(e)),
        };
        if result.monster_image.is_empty() {
            return self.fail(SessionError::InvalidResponse("monster_image is empty".into()));
        }

        let rank = Rank::draw(&mut self.rng);
        let name = result
            .monster_name
            .as_deref()
            .map(clamp_monster_name)
            .unwrap_or_else(|| default_monster_name(result.category));

        info!(category = %result.category, %rank, "classification succeeded");
        self.state.draft_rank = Some(rank);
        self.state.draft_name = name;
        self.state.tip_cursor = 0;
        self.state.pending_result = Some(result);

        match self.order {
            GuideOrder::GuideFirst => self.transition(Step::Intro),
            GuideOrder::NameFirst => self.transition(Step::Naming),
        }
    }

    /// intro → guide
    pub fn start_guide(&mut self) -> Result<Step, WorkflowError> {
        self.expect_step(Step::Intro, "start_guide")?;
        self.state.tip_cursor = 0;
        Ok(self.transition(Step::Guide))
    }

    /// 次のティップへ。最後のティップでは次の段階へ進む
    pub fn next_tip(&mut self) -> Result<Step, WorkflowError> {
        self.expect_step(Step::Guide, "next_tip")?;

        let tip_count = self.guide().map(|g| g.tips.len()).unwrap_or(0);
        if self.state.tip_cursor + 1 < tip_count {
            self.state.tip_cursor += 1;
            return Ok(self.state.step);
        }

        match self.order {
            GuideOrder::GuideFirst => Ok(self.transition(Step::Naming)),
            GuideOrder::NameFirst => Ok(self.commit()),
        }
    }

    /// 入力途中の名前を更新（上限文字数で切り詰める）
    pub fn set_draft_name(&mut self, name: &str) -> Result<(), WorkflowError> {
        self.expect_step(Step::Naming, "set_draft_name")?;
        self.state.draft_name = clamp_monster_name(name);
        Ok(())
    }

    /// 名前を確定する
    ///
    /// 空・上限超過の名前はエラーで、状態は naming のまま。
    pub fn submit_name(&mut self, name: &str) -> Result<Step, WorkflowError> {
        self.expect_step(Step::Naming, "submit_name")?;
        let name = validate_monster_name(name).map_err(WorkflowError::InvalidName)?;
        self.state.draft_name = name;

        match self.order {
            GuideOrder::GuideFirst => Ok(self.commit()),
            GuideOrder::NameFirst => {
                self.state.name_confirmed = true;
                self.state.tip_cursor = 0;
                Ok(self.transition(Step::Guide))
            }
        }
    }

    /// 図鑑へ保存して complete へ
    ///
    /// 保存に失敗した場合は下書きと現在の段階を残し、last_error に記録する。
    fn commit(&mut self) -> Step {
        if let Some(id) = self.state.committed_id {
            debug!(id, "session already committed");
            return self.transition(Step::Complete);
        }

        if self.order == GuideOrder::NameFirst && !self.state.name_confirmed {
            return self.fail(SessionError::Persistence("이름이 정해지지 않았어요".into()));
        }

        let (Some(result), Some(rank)) = (self.state.pending_result.as_ref(), self.state.draft_rank) else {
            return self.fail(SessionError::Persistence("분류 결과가 없어요".into()));
        };
        let name = match validate_monster_name(&self.state.draft_name) {
            Ok(name) => name,
            Err(e) => return self.fail(SessionError::Persistence(e.to_string())),
        };

        let item = NewCollectionItem {
            category: result.category,
            monster_name: name,
            monster_image: result.monster_image.clone(),
            rank,
            captured_at: Utc::now(),
        };

        match self.store.append(item) {
            Ok(id) => {
                info!(id, "monster added to collection");
                self.state.committed_id = Some(id);
                self.state.last_error = None;
                self.transition(Step::Complete)
            }
            Err(e) => {
                warn!("failed to append collection item: {}", e);
                self.state.last_error = Some(SessionError::Persistence(e.to_string()));
                self.state.step
            }
        }
    }

    /// naming → idle（保存せずに手放す）
    pub fn release(&mut self) -> Result<Step, WorkflowError> {
        self.expect_step(Step::Naming, "release")?;
        info!("monster released without saving");
        Ok(self.reset_to_idle())
    }

    /// complete → idle
    pub fn capture_again(&mut self) -> Result<Step, WorkflowError> {
        self.expect_step(Step::Complete, "capture_again")?;
        Ok(self.reset_to_idle())
    }

    /// error → idle
    pub fn retry(&mut self) -> Result<Step, WorkflowError> {
        self.expect_step(Step::Error, "retry")?;
        Ok(self.reset_to_idle())
    }

    /// どの段階からでもセッションを破棄する（画面を離れた場合など）
    ///
    /// 進行中の分類リクエストは中断しないが、その結果は反映されない。
    pub fn abandon(&mut self) -> Step {
        self.reset_to_idle()
    }

    fn reset_to_idle(&mut self) -> Step {
        self.state.reset();
        self.captured_image = None;
        self.session += 1;
        self.ensure_device_running()
    }
}
