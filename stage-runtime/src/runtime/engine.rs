//! # Engine 模块
//!
//! 阶段过渡编排器（状态机）。
//!
//! ## 执行模型
//!
//! ```text
//! tick(input, now) -> Vec<StageCommand>
//! ```
//!
//! 1. 处理输入（非 Idle 时推进输入直接丢弃，不排队）
//! 2. 常驻云按距上一帧的时间差下落
//! 3. 统一处理 tween 列表：对话停留、爆发、黑屏计时
//! 4. 返回本帧产生的展示指令
//!
//! 编排器从不阻塞，所有等待都是 tween 列表里的一条记录。

use tracing::{debug, info};

use crate::color::Color;
use crate::command::StageCommand;
use crate::input::{InputOutcome, StoryInput};
use crate::particle::CloudField;
use crate::stage::{Stage, StageCatalog};
use crate::state::{BurstPlan, Presentation, StoryState, TransitionState, TransitionTiming};
use crate::tween::{TweenEvent, TweenScheduler};

/// 调度中的计时
#[derive(Debug, Clone, Copy, PartialEq)]
enum Scheduled {
    /// 开场黑屏
    Opening,
    /// 对话停留
    DialogHold,
    /// 爆发动画
    Burst(BurstPlan),
    /// 回到标题前的黑屏
    WrapFade(BurstPlan),
}

/// 阶段过渡编排器
///
/// 独占持有 `StoryState` 和粒子场，是二者唯一的写入者。
///
/// # 使用示例
///
/// ```ignore
/// let mut orchestrator = Orchestrator::new(StageCatalog::builtin(), seed, timing);
///
/// loop {
///     let now = clock.now();
///     let commands = orchestrator.tick(input.take(), now);
///     // Host 执行 commands，然后用 orchestrator.field() 渲染云层
/// }
/// ```
pub struct Orchestrator {
    catalog: StageCatalog,
    field: CloudField,
    timing: TransitionTiming,
    state: StoryState,
    tweens: TweenScheduler<Scheduled>,
    active_burst: Option<BurstPlan>,
    last_frame: Option<f64>,
}

impl Orchestrator {
    /// 创建编排器，粒子场使用第 0 阶段色调
    pub fn new(catalog: StageCatalog, seed: u64, timing: TransitionTiming) -> Self {
        let tint = catalog.get(0).tint;
        Self::with_field(catalog, CloudField::new(seed, tint), timing)
    }

    /// 使用已有粒子场创建编排器
    pub fn with_field(catalog: StageCatalog, field: CloudField, timing: TransitionTiming) -> Self {
        let state = StoryState::new(field.steady_tint());
        Self {
            catalog,
            field,
            timing,
            state,
            tweens: TweenScheduler::new(),
            active_burst: None,
            last_frame: None,
        }
    }

    /// 核心驱动函数：处理可选输入后推进一帧
    pub fn tick(&mut self, input: Option<StoryInput>, now: f64) -> Vec<StageCommand> {
        let mut commands = Vec::new();
        if let Some(input) = input {
            self.handle_input(input, now, &mut commands);
        }
        self.advance_frame(now, &mut commands);
        commands
    }

    /// 只处理输入，不推进帧
    pub fn submit(&mut self, input: StoryInput, now: f64) -> (InputOutcome, Vec<StageCommand>) {
        let mut commands = Vec::new();
        let outcome = self.handle_input(input, now, &mut commands);
        (outcome, commands)
    }

    /// 只推进帧
    pub fn update(&mut self, now: f64) -> Vec<StageCommand> {
        let mut commands = Vec::new();
        self.advance_frame(now, &mut commands);
        commands
    }

    fn handle_input(
        &mut self,
        input: StoryInput,
        now: f64,
        out: &mut Vec<StageCommand>,
    ) -> InputOutcome {
        match input {
            StoryInput::Start => {
                if !self.state.accepts_start() {
                    debug!(state = ?self.state.transition, presentation = ?self.state.presentation, "忽略开始输入");
                    return InputOutcome::Ignored;
                }
                self.state.presentation = Presentation::Opening;
                out.push(StageCommand::fade_overlay(1.0));
                self.tweens
                    .schedule(Scheduled::Opening, now, self.timing.opening_fade);
                info!("开场：黑屏 {}s", self.timing.opening_fade);
                InputOutcome::Accepted
            }
            StoryInput::Advance => {
                if !self.state.accepts_advance() {
                    debug!(state = ?self.state.transition, presentation = ?self.state.presentation, "过渡进行中，丢弃推进输入");
                    return InputOutcome::Ignored;
                }
                let stage = self.catalog.get(self.state.stage_index);
                out.push(StageCommand::ShowDialog {
                    text: stage.dialog.clone(),
                });
                self.state.dialog_visible = true;
                self.state.transition = TransitionState::DialogHold;
                self.tweens
                    .schedule(Scheduled::DialogHold, now, self.timing.dialog_hold);
                info!(stage = stage.index, "进入 DialogHold: {}", stage.name);
                InputOutcome::Accepted
            }
        }
    }

    fn advance_frame(&mut self, now: f64, out: &mut Vec<StageCommand>) {
        let dt = match self.last_frame {
            Some(previous) if now > previous => now - previous,
            _ => 0.0,
        };
        if self.last_frame.is_none_or(|previous| now > previous) {
            self.last_frame = Some(now);
        }

        self.field.advance_steady(dt as f32);

        for event in self.tweens.update(now) {
            match event {
                TweenEvent::Progress {
                    tag: Scheduled::Burst(plan),
                    progress,
                    ..
                } => self.field.advance_burst(progress, plan.to),
                TweenEvent::Progress { .. } => {}
                TweenEvent::Completed { tag, .. } => self.on_completed(tag, now, out),
            }
        }
    }

    fn on_completed(&mut self, tag: Scheduled, now: f64, out: &mut Vec<StageCommand>) {
        match tag {
            Scheduled::Opening => self.finish_opening(out),
            Scheduled::DialogHold => self.start_burst(now),
            Scheduled::Burst(plan) => {
                self.state.transition = TransitionState::Committing;
                self.commit(plan, now, out);
            }
            Scheduled::WrapFade(plan) => self.finish_wrap(plan, out),
        }
    }

    fn finish_opening(&mut self, out: &mut Vec<StageCommand>) {
        out.push(StageCommand::HideTitle);
        out.push(StageCommand::PlayMusic);

        self.state.stage_index = 0;
        self.emit_stage_assets(0, out);
        let tint = self.catalog.get(0).tint;
        self.field.tint_steady(tint);
        self.state.tint = tint;

        out.push(StageCommand::HideDialog);
        self.state.dialog_visible = false;
        out.push(StageCommand::fade_overlay(0.0));
        self.state.presentation = Presentation::Story;
        info!("开场结束，进入第 0 阶段");
    }

    fn start_burst(&mut self, now: f64) {
        let next_index = self.state.stage_index + 1;
        let target = self.catalog.get(next_index % self.catalog.count());
        let plan = BurstPlan {
            next_index,
            from: self.state.tint,
            to: target.tint,
        };

        self.field.spawn_burst(plan.from);
        self.tweens
            .schedule(Scheduled::Burst(plan), now, self.timing.burst);
        self.active_burst = Some(plan);
        self.state.transition = TransitionState::Bursting;
        info!(
            next = plan.next_index,
            from = ?plan.from,
            to = ?plan.to,
            "开始爆发 ({}s)",
            self.timing.burst
        );
    }

    fn commit(&mut self, plan: BurstPlan, now: f64, out: &mut Vec<StageCommand>) {
        if plan.next_index < self.catalog.count() {
            self.commit_stage(plan.next_index, plan.to, out);
            out.push(StageCommand::HideDialog);
            self.state.dialog_visible = false;
            self.end_cycle();
            info!(stage = plan.next_index, "阶段提交完成");
        } else {
            out.push(StageCommand::fade_overlay(1.0));
            self.tweens
                .schedule(Scheduled::WrapFade(plan), now, self.timing.wrap_fade);
            info!("阶段序列结束，黑屏 {}s 后回到标题", self.timing.wrap_fade);
        }
    }

    fn finish_wrap(&mut self, plan: BurstPlan, out: &mut Vec<StageCommand>) {
        self.commit_stage(0, plan.to, out);
        out.push(StageCommand::HideDialog);
        self.state.dialog_visible = false;
        out.push(StageCommand::ShowTitle);
        out.push(StageCommand::fade_overlay(0.0));
        self.state.presentation = Presentation::Title;
        self.end_cycle();
        info!("回到标题画面");
    }

    /// 移除爆发云并切换到 `index` 阶段
    fn commit_stage(&mut self, index: usize, tint: Color, out: &mut Vec<StageCommand>) {
        self.field.commit_burst(tint);
        self.state.tint = tint;
        self.state.stage_index = index;
        self.emit_stage_assets(index, out);
        self.field.reset_steady_positions();
    }

    fn emit_stage_assets(&self, index: usize, out: &mut Vec<StageCommand>) {
        let stage = self.catalog.get(index);
        out.push(StageCommand::ShowBackground {
            stage: index,
            path: stage.background.clone(),
        });
        out.push(StageCommand::SetStageLabel {
            text: stage.label(),
        });
    }

    fn end_cycle(&mut self) {
        self.active_burst = None;
        self.state.transition = TransitionState::Idle;
        self.state.completed_cycles += 1;
    }

    // ========== 查询方法 ==========

    /// 当前状态
    pub fn state(&self) -> &StoryState {
        &self.state
    }

    /// 当前过渡状态
    pub fn transition(&self) -> TransitionState {
        self.state.transition
    }

    /// 当前阶段
    pub fn current_stage(&self) -> &Stage {
        self.catalog.get(self.state.stage_index)
    }

    /// 阶段目录
    pub fn catalog(&self) -> &StageCatalog {
        &self.catalog
    }

    /// 粒子场（用于渲染）
    pub fn field(&self) -> &CloudField {
        &self.field
    }

    /// 时长配置
    pub fn timing(&self) -> &TransitionTiming {
        &self.timing
    }

    /// 进行中的爆发参数
    pub fn active_burst(&self) -> Option<BurstPlan> {
        self.active_burst
    }

    /// 是否正在过渡（包括开场）
    pub fn is_busy(&self) -> bool {
        !self.state.transition.is_idle() || self.state.presentation == Presentation::Opening
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("stage_index", &self.state.stage_index)
            .field("transition", &self.state.transition)
            .field("presentation", &self.state.presentation)
            .field("pending_tweens", &self.tweens.len())
            .field("transient", &self.field.transient_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::interpolate;
    use crate::particle::{BURST_COUNT, BURST_FLOOR, STEADY_COUNT};

    const STEP: f64 = 0.5;

    fn orchestrator() -> Orchestrator {
        Orchestrator::new(StageCatalog::builtin(), 7, TransitionTiming::default())
    }

    /// 完成开场，返回当前时间
    fn start_story(o: &mut Orchestrator) -> f64 {
        o.tick(Some(StoryInput::Start), 0.0);
        o.tick(None, 2.0);
        assert_eq!(o.state().presentation, Presentation::Story);
        2.0
    }

    /// 触发一次推进并运行到 Idle
    fn run_cycle(o: &mut Orchestrator, now: &mut f64) -> Vec<StageCommand> {
        let mut commands = o.tick(Some(StoryInput::Advance), *now);
        for _ in 0..1000 {
            if o.transition().is_idle() {
                break;
            }
            *now += STEP;
            commands.extend(o.tick(None, *now));
        }
        assert!(o.transition().is_idle(), "过渡没有结束");
        commands
    }

    fn dialogs(commands: &[StageCommand]) -> Vec<String> {
        commands
            .iter()
            .filter_map(|c| match c {
                StageCommand::ShowDialog { text } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    fn backgrounds(commands: &[StageCommand]) -> Vec<usize> {
        commands
            .iter()
            .filter_map(|c| match c {
                StageCommand::ShowBackground { stage, .. } => Some(*stage),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_initial_title_rejects_advance() {
        let mut o = orchestrator();
        assert_eq!(o.transition(), TransitionState::Idle);
        assert_eq!(o.state().presentation, Presentation::Title);

        let (outcome, commands) = o.submit(StoryInput::Advance, 0.0);
        assert_eq!(outcome, InputOutcome::Ignored);
        assert!(commands.is_empty());
    }

    #[test]
    fn test_opening_sequence() {
        let mut o = orchestrator();
        let commands = o.tick(Some(StoryInput::Start), 0.0);
        assert_eq!(commands, vec![StageCommand::SetFadeOverlay { opacity: 1.0 }]);
        assert_eq!(o.state().presentation, Presentation::Opening);
        assert!(o.is_busy());

        // 开场期间的输入全部丢弃
        assert_eq!(o.submit(StoryInput::Advance, 1.0).0, InputOutcome::Ignored);
        assert_eq!(o.submit(StoryInput::Start, 1.0).0, InputOutcome::Ignored);
        assert!(o.tick(None, 1.5).is_empty());

        let commands = o.tick(None, 2.0);
        assert_eq!(
            commands,
            vec![
                StageCommand::HideTitle,
                StageCommand::PlayMusic,
                StageCommand::ShowBackground {
                    stage: 0,
                    path: "skytexture/Denial.png".to_string()
                },
                StageCommand::SetStageLabel {
                    text: "Stage: Denial".to_string()
                },
                StageCommand::HideDialog,
                StageCommand::SetFadeOverlay { opacity: 0.0 },
            ]
        );
        assert_eq!(o.state().presentation, Presentation::Story);
        assert_eq!(o.state().tint.to_hex(), 0xA4B9FF);
        assert!(!o.is_busy());
    }

    #[test]
    fn test_single_transition_phases() {
        let mut o = orchestrator();
        let now = start_story(&mut o);

        let (outcome, commands) = o.submit(StoryInput::Advance, now);
        assert!(outcome.is_accepted());
        assert_eq!(dialogs(&commands), vec![o.catalog().get(0).dialog.clone()]);
        assert_eq!(o.transition(), TransitionState::DialogHold);
        assert!(o.state().dialog_visible);

        // 停留期间没有爆发
        o.tick(None, now + 2.5);
        assert_eq!(o.transition(), TransitionState::DialogHold);
        assert_eq!(o.field().transient_count(), 0);

        // 停留结束 -> 爆发
        o.tick(None, now + 3.0);
        assert_eq!(o.transition(), TransitionState::Bursting);
        assert_eq!(o.field().transient_count(), BURST_COUNT);
        let plan = o.active_burst().unwrap();
        assert_eq!(plan.next_index, 1);
        assert_eq!(plan.from.to_hex(), 0xA4B9FF);
        assert_eq!(plan.to.to_hex(), 0xFF4E4E);

        // 爆发结束 -> 提交 -> Idle
        let commands = o.tick(None, now + 3.0 + 8.0);
        assert_eq!(o.transition(), TransitionState::Idle);
        assert_eq!(o.state().stage_index, 1);
        assert_eq!(o.field().transient_count(), 0);
        assert_eq!(o.field().steady_count(), STEADY_COUNT);
        assert_eq!(o.state().tint.to_hex(), 0xFF4E4E);
        assert!(o.field().steady().iter().all(|p| p.color == o.state().tint));
        assert_eq!(backgrounds(&commands), vec![1]);
        assert!(commands.contains(&StageCommand::SetStageLabel {
            text: "Stage: Anger".to_string()
        }));
        assert_eq!(commands.last(), Some(&StageCommand::HideDialog));
        assert!(o.active_burst().is_none());
    }

    #[test]
    fn test_burst_color_midpoint() {
        let mut o = orchestrator();
        let now = start_story(&mut o);
        o.tick(Some(StoryInput::Advance), now);
        o.tick(None, now + 3.0);
        o.tick(None, now + 3.0 + 4.0);

        let expected = interpolate(Color::from_hex(0xA4B9FF), Color::from_hex(0xFF4E4E), 0.5);
        assert_eq!(o.field().transient_count(), BURST_COUNT);
        assert!(o.field().transient().iter().all(|p| p.color == expected));
    }

    #[test]
    fn test_double_trigger_runs_one_cycle() {
        let mut o = orchestrator();
        let mut now = start_story(&mut o);

        let (first, _) = o.submit(StoryInput::Advance, now);
        let (second, second_commands) = o.submit(StoryInput::Advance, now);
        assert_eq!(first, InputOutcome::Accepted);
        assert_eq!(second, InputOutcome::Ignored);
        assert!(second_commands.is_empty());

        let mut commands = Vec::new();
        while !o.transition().is_idle() {
            now += STEP;
            commands.extend(o.tick(Some(StoryInput::Advance), now));
        }
        assert!(dialogs(&commands).is_empty());
        assert_eq!(backgrounds(&commands), vec![1]);
        assert_eq!(o.state().stage_index, 1);
        assert_eq!(o.state().completed_cycles, 1);
    }

    #[test]
    fn test_advance_ignored_in_every_busy_state() {
        let mut o = orchestrator();
        let mut now = start_story(&mut o);
        o.tick(Some(StoryInput::Advance), now);

        let mut seen = Vec::new();
        while !o.transition().is_idle() {
            seen.push(o.transition());
            assert_eq!(o.submit(StoryInput::Advance, now).0, InputOutcome::Ignored);
            assert_eq!(o.submit(StoryInput::Start, now).0, InputOutcome::Ignored);
            now += STEP;
            o.tick(None, now);
        }
        assert!(seen.contains(&TransitionState::DialogHold));
        assert!(seen.contains(&TransitionState::Bursting));
    }

    #[test]
    fn test_full_sequence_wraps_to_title() {
        let mut o = orchestrator();
        let mut now = start_story(&mut o);
        let catalog = StageCatalog::builtin();
        let n = catalog.count();

        let mut shown = Vec::new();
        for expected_next in 1..n {
            let commands = run_cycle(&mut o, &mut now);
            shown.extend(dialogs(&commands));
            assert_eq!(backgrounds(&commands), vec![expected_next]);
            assert_eq!(o.state().stage_index, expected_next);
            assert_eq!(o.current_stage().tint, catalog.get(expected_next).tint);
        }

        // 最后一个阶段：黑屏后回到标题
        let mut commands = o.tick(Some(StoryInput::Advance), now);
        let mut phases = vec![o.transition()];
        for _ in 0..1000 {
            if o.transition().is_idle() {
                break;
            }
            now += STEP;
            commands.extend(o.tick(None, now));
            if phases.last() != Some(&o.transition()) {
                phases.push(o.transition());
            }
        }
        shown.extend(dialogs(&commands));

        let expected: Vec<String> = catalog.iter().map(|s| s.dialog.clone()).collect();
        assert_eq!(shown, expected);

        insta::assert_debug_snapshot!(phases, @r"
        [
            DialogHold,
            Bursting,
            Committing,
            Idle,
        ]
        ");

        let fade_in = commands
            .iter()
            .position(|c| *c == StageCommand::SetFadeOverlay { opacity: 1.0 })
            .unwrap();
        let title = commands
            .iter()
            .position(|c| *c == StageCommand::ShowTitle)
            .unwrap();
        assert!(fade_in < title);
        assert_eq!(
            commands.last(),
            Some(&StageCommand::SetFadeOverlay { opacity: 0.0 })
        );
        assert_eq!(backgrounds(&commands), vec![0]);

        assert_eq!(o.state().stage_index, 0);
        assert_eq!(o.state().presentation, Presentation::Title);
        assert_eq!(o.state().tint, catalog.get(0).tint);
        assert_eq!(o.field().transient_count(), 0);
        assert_eq!(o.state().completed_cycles, n as u64);

        // 标题画面不接受推进，可以重新开始
        assert_eq!(o.submit(StoryInput::Advance, now).0, InputOutcome::Ignored);
        assert_eq!(o.submit(StoryInput::Start, now).0, InputOutcome::Accepted);
    }

    #[test]
    fn test_wrap_keeps_burst_until_fade_finishes() {
        let timing = TransitionTiming::new(1.0, 1.0, 4.0, 0.0).unwrap();
        let catalog = StageCatalog::new(vec![Stage::new("Only", "only.png", 0x123456, "alone")])
            .unwrap();
        let mut o = Orchestrator::new(catalog, 3, timing);
        o.tick(Some(StoryInput::Start), 0.0);
        assert_eq!(o.state().presentation, Presentation::Story);

        o.tick(Some(StoryInput::Advance), 1.0);
        o.tick(None, 2.0);
        let commands = o.tick(None, 3.0);
        assert_eq!(commands, vec![StageCommand::SetFadeOverlay { opacity: 1.0 }]);
        assert_eq!(o.transition(), TransitionState::Committing);
        assert_eq!(o.field().transient_count(), BURST_COUNT);

        o.tick(None, 5.0);
        assert_eq!(o.transition(), TransitionState::Committing);

        o.tick(None, 7.0);
        assert_eq!(o.transition(), TransitionState::Idle);
        assert_eq!(o.field().transient_count(), 0);
        assert_eq!(o.state().presentation, Presentation::Title);
    }

    #[test]
    fn test_large_frame_gap_never_overshoots() {
        let mut o = orchestrator();
        let now = start_story(&mut o);
        o.tick(Some(StoryInput::Advance), now);
        o.tick(None, now + 3.0);
        let to = o.active_burst().unwrap().to;

        // 爆发开始后立刻有一帧过去了很久：进度被限制为 1，先应用再提交
        let mut probe = o.field().clone();
        probe.advance_burst(1.0, to);
        assert!(
            probe
                .transient()
                .iter()
                .all(|p| p.position.y == BURST_FLOOR && p.color == to)
        );

        o.tick(None, now + 1000.0);
        assert_eq!(o.transition(), TransitionState::Idle);
        assert_eq!(o.state().tint, to);
        for p in o.field().particles() {
            assert!(p.position.y >= -5.0 && p.position.y < 7.0);
        }
    }

    #[test]
    fn test_steady_count_constant_across_cycles() {
        let mut o = orchestrator();
        let mut now = start_story(&mut o);
        for _ in 0..7 {
            if o.state().presentation == Presentation::Title {
                o.tick(Some(StoryInput::Start), now);
                now += 2.0;
                o.tick(None, now);
            }
            o.tick(Some(StoryInput::Advance), now);
            while !o.transition().is_idle() {
                now += STEP;
                o.tick(None, now);
                assert_eq!(o.field().steady_count(), STEADY_COUNT);
                let transient = o.field().transient_count();
                assert!(transient == 0 || transient == BURST_COUNT);
            }
            assert_eq!(o.field().transient_count(), 0);
        }
    }

    #[test]
    fn test_steady_drift_runs_while_idle() {
        let mut o = orchestrator();
        o.tick(None, 0.0);
        let before: Vec<f32> = o.field().steady().iter().map(|p| p.position.y).collect();
        o.tick(None, 0.5);
        let moved = o
            .field()
            .steady()
            .iter()
            .zip(before)
            .filter(|(p, y)| p.position.y != *y)
            .count();
        assert_eq!(moved, STEADY_COUNT);

        // 时间倒退不会让云上升
        let snapshot = o.field().steady().to_vec();
        o.tick(None, 0.1);
        assert_eq!(o.field().steady(), snapshot.as_slice());
    }
}
