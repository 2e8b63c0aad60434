//! End-to-end planner scenarios on hand-built worlds.
//!
//! Each test drives the planner the way an episode runner does: ask for an
//! action, apply it to the world, report it back on the next call.

#![allow(
    clippy::unwrap_used,
    clippy::panic,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects,
    clippy::too_many_lines
)]

use std::collections::VecDeque;

use babybot_planner::{
    BabyBot, BfsStats, Blockers, Observability, PlannerConfig, PlannerError, Reason, Subgoal,
    SubgoalKind, Target, VisibilityMask, parse_subgoal_plan, pathfinder::shortest_path,
};
use babybot_types::{
    Action, Color, Direction, GridPosition, Instruction, ObjectDescriptor, ObjectKind, WorldObject,
    WorldView,
};
use babybot_world::{GridWorld, parse_map};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

// =============================================================================
// Helpers
// =============================================================================

/// Drive `bot` until it says done. Returns the applied actions.
fn drive(world: &mut GridWorld, bot: &mut BabyBot, max_ticks: usize) -> Result<Vec<Action>, PlannerError> {
    let mut actions = Vec::new();
    let mut last = None;
    for _ in 0..max_ticks {
        let action = bot.replan(&*world, last)?;
        if action == Action::Done {
            return Ok(actions);
        }
        world.step(action);
        actions.push(action);
        last = Some(action);
    }
    Err(PlannerError::Stuck {
        iterations: u32::try_from(max_ticks).unwrap(),
    })
}

/// Like [`drive`], for a bot whose last suggested action was already
/// applied. Panics if the bot fails or never finishes.
fn drive_from(world: &mut GridWorld, bot: &mut BabyBot, applied: Action, max_ticks: usize) -> Vec<Action> {
    let mut actions = Vec::new();
    let mut last = Some(applied);
    for _ in 0..max_ticks {
        let action = bot.replan(&*world, last).unwrap();
        if action == Action::Done {
            return actions;
        }
        world.step(action);
        actions.push(action);
        last = Some(action);
    }
    panic!("bot did not finish within {max_ticks} ticks");
}

fn desc(kind: ObjectKind, color: Color) -> ObjectDescriptor {
    ObjectDescriptor::new(kind, Some(color))
}

fn mission_bot(world: &GridWorld, instruction: &Instruction, config: PlannerConfig) -> BabyBot {
    let mut bot = BabyBot::new(world, config);
    bot.provide_initial_subgoals(instruction);
    bot
}

// =============================================================================
// Locked doors
// =============================================================================

#[test]
fn locked_door_is_opened_with_fetched_key_and_key_is_dropped() {
    let mut world = parse_map(
        "
WWWWWWWWWWWWWW
WW....KRWW..WW
WW....>>LR..WW
WW......WW..WW
WWWWWWWWWWWWWW
",
    )
    .unwrap();
    let door_pos = GridPosition::new(4, 2);
    let instruction = Instruction::open(desc(ObjectKind::Door, Color::Red));
    world.set_mission(instruction.clone());
    let mut bot = mission_bot(&world, &instruction, PlannerConfig::default());
    let pushed_at_start = bot.subgoals_pushed();

    let actions = drive(&mut world, &mut bot, 50).unwrap();

    assert_eq!(
        actions,
        vec![
            Action::Left,
            Action::Pickup,
            Action::Right,
            Action::Toggle,
            Action::Right,
            Action::Drop,
        ]
    );
    let door = world.cell(door_pos).unwrap();
    assert!(door.is_open);
    assert!(!door.is_locked);
    assert!(world.carrying().is_none());
    assert_eq!(world.cell(GridPosition::new(3, 3)).unwrap().kind, ObjectKind::Key);
    assert!(world.mission_succeeded());
    // Key fetch and key drop were planned on the fly and fully consumed.
    assert!(bot.subgoals_pushed() > pushed_at_start);
    assert!(bot.stack().is_empty());
}

#[test]
fn closed_door_on_the_way_is_opened() {
    let mut world = parse_map(
        "
WWWWWWWWWWWWWW
WW>>..DB..ARWW
WWWWWWWWWWWWWW
",
    )
    .unwrap();
    let mut bot = mission_bot(
        &world,
        &Instruction::go_to(desc(ObjectKind::Ball, Color::Red)),
        PlannerConfig::default(),
    );
    let actions = drive(&mut world, &mut bot, 50).unwrap();
    assert_eq!(
        actions,
        vec![Action::Forward, Action::Toggle, Action::Forward, Action::Forward]
    );
    assert_eq!(world.front_pos(), GridPosition::new(5, 1));
}

#[test]
fn locked_door_in_the_middle_of_a_path_is_unlocked_on_the_way() {
    let mut world = parse_map(
        "
WWWWWWWWWWWWWWWW
WW>>..KRWW..ARWW
WW......LR....WW
WWWWWWWWWWWWWWWW
",
    )
    .unwrap();
    let instruction = Instruction::go_to(desc(ObjectKind::Ball, Color::Red));
    world.set_mission(instruction.clone());
    let mut bot = mission_bot(&world, &instruction, PlannerConfig::default());

    let actions = drive(&mut world, &mut bot, 60).unwrap();

    assert_eq!(
        actions,
        vec![
            Action::Forward,
            Action::Pickup,
            Action::Forward,
            Action::Right,
            Action::Forward,
            Action::Left,
            Action::Toggle,
            Action::Left,
            Action::Drop,
            Action::Right,
            Action::Forward,
            Action::Forward,
            Action::Forward,
            Action::Left,
        ]
    );
    let door = world.cell(GridPosition::new(4, 2)).unwrap();
    assert!(door.is_open);
    assert!(!door.is_locked);
    assert!(world.carrying().is_none());
    assert_eq!(world.cell(GridPosition::new(3, 1)).unwrap().kind, ObjectKind::Key);
    assert!(world.mission_succeeded());
}

// =============================================================================
// Blockers
// =============================================================================

#[test]
fn blocker_in_corridor_is_moved_aside() {
    let mut world = parse_map(
        "
WWWWWWWWWWWWWWWW
WW....WWWWWWWWWW
WW>>..AG..KR..WW
WW....WWWWWWWWWW
WWWWWWWWWWWWWWWW
",
    )
    .unwrap();
    let instruction = Instruction::go_to(desc(ObjectKind::Key, Color::Red));
    world.set_mission(instruction.clone());
    let mut bot = mission_bot(&world, &instruction, PlannerConfig::default());

    let actions = drive(&mut world, &mut bot, 50).unwrap();

    assert_eq!(
        actions,
        vec![
            Action::Forward,
            Action::Pickup,
            Action::Right,
            Action::Drop,
            Action::Left,
            Action::Forward,
            Action::Forward,
        ]
    );
    let moved = world.cell(GridPosition::new(2, 3)).unwrap();
    assert_eq!((moved.kind, moved.color), (ObjectKind::Ball, Color::Green));
    assert!(world.cell(GridPosition::new(3, 2)).is_none());
    assert!(world.mission_succeeded());
}

#[test]
fn blocked_target_needs_the_fallback_search() {
    let world = parse_map(
        "
WWWWWWWWWWWW
WW>>..AR..WW
WWWWWWWWWWWW
",
    )
    .unwrap();
    let mask = VisibilityMask::new(world.width(), world.height(), true);
    let mut stats = BfsStats::default();
    let target = GridPosition::new(4, 1);
    let accept = |pos: GridPosition, _: Option<&WorldObject>| pos == target;
    assert!(shortest_path(&world, &mask, &mut stats, &accept, Blockers::Avoid, None).is_none());
    let path = shortest_path(&world, &mask, &mut stats, &accept, Blockers::Fallback, None).unwrap();
    assert!(!path.is_empty());
    assert!(path.with_blockers);
}

#[test]
fn full_hands_are_emptied_before_a_second_pickup() {
    let mut world = parse_map(
        "
WWWWWWWWWWWW
WW>>AR....WW
WWKB......WW
WW........WW
WWWWWWWWWWWW
",
    )
    .unwrap();
    let key_pos = GridPosition::new(1, 2);
    let mut bot = BabyBot::with_plan(
        &world,
        PlannerConfig::default(),
        [Subgoal::pickup(), Subgoal::go_to_pos(key_pos), Subgoal::pickup()],
    );

    let actions = drive(&mut world, &mut bot, 40).unwrap();

    let count = |wanted: Action| actions.iter().filter(|a| **a == wanted).count();
    assert_eq!(count(Action::Pickup), 2);
    assert_eq!(count(Action::Drop), 1);
    let held = world.carrying().unwrap();
    assert_eq!((held.kind, held.color), (ObjectKind::Key, Color::Blue));
    let stashed = world.cell(GridPosition::new(3, 1)).unwrap();
    assert_eq!((stashed.kind, stashed.color), (ObjectKind::Ball, Color::Red));
    assert!(world.cell(key_pos).is_none());
    // Go to the stash cell, drop, come back.
    assert_eq!(bot.subgoals_pushed(), 3);
    assert!(bot.stack().is_empty());
}

#[test]
fn blocker_is_cleared_while_carrying_something() {
    let mut world = parse_map(
        "
WWWWWWWWWWWWWWWWWW
WW>>AR....WWWWWWWW
WW........AG..KBWW
WW........WWWWWWWW
WWWWWWWWWWWWWWWWWW
",
    )
    .unwrap();
    let instruction = Instruction::put_next(
        desc(ObjectKind::Ball, Color::Red),
        desc(ObjectKind::Key, Color::Blue),
    );
    world.set_mission(instruction.clone());
    let mut bot = mission_bot(&world, &instruction, PlannerConfig::default());

    let actions = drive(&mut world, &mut bot, 80).unwrap();

    // Red ball up, stashed, blocker moved, red ball back up, red ball placed.
    let count = |wanted: Action| actions.iter().filter(|a| **a == wanted).count();
    assert_eq!(count(Action::Pickup), 3);
    assert_eq!(count(Action::Drop), 3);
    assert!(world.mission_succeeded());
    assert!(world.carrying().is_none());
    let placed = world.cell(GridPosition::new(6, 2)).unwrap();
    assert_eq!((placed.kind, placed.color), (ObjectKind::Ball, Color::Red));
    assert!(world.cell(GridPosition::new(5, 2)).is_none());
    assert!(
        world
            .objects()
            .any(|(_, obj)| obj.kind == ObjectKind::Ball && obj.color == Color::Green)
    );
    assert!(bot.stack().is_empty());
}

// =============================================================================
// Doors in front
// =============================================================================

#[test]
fn open_facing_an_open_door_closes_it_first() {
    let mut world = parse_map(
        "
WWWWWWWWWW
WW>>OB..WW
WWWWWWWWWW
",
    )
    .unwrap();
    let mut bot = BabyBot::with_plan(&world, PlannerConfig::default(), [Subgoal::open(None)]);

    assert_eq!(bot.replan(&world, None).unwrap(), Action::Toggle);
    let top = bot.stack().top().copied().unwrap();
    assert_eq!(top.kind, SubgoalKind::Close);

    world.step(Action::Toggle);
    assert!(!world.cell(GridPosition::new(2, 1)).unwrap().is_open);
    let rest = drive_from(&mut world, &mut bot, Action::Toggle, 5);
    assert_eq!(rest, vec![Action::Toggle]);
    assert!(world.cell(GridPosition::new(2, 1)).unwrap().is_open);
    assert!(bot.stack().is_empty());
}

// =============================================================================
// Reacting to actions the plan did not ask for
// =============================================================================

#[test]
fn unplanned_turn_is_undone() {
    let mut world = parse_map(
        "
WWWWWWWWWW
WW>>AR..WW
WW......WW
WWWWWWWWWW
",
    )
    .unwrap();
    let ball_pos = GridPosition::new(2, 1);
    let mut bot = BabyBot::with_plan(&world, PlannerConfig::default(), [Subgoal::pickup()]);
    assert_eq!(bot.replan(&world, None).unwrap(), Action::Pickup);

    // Something else turned the agent away from the ball.
    world.step(Action::Left);
    let action = bot.replan(&world, Some(Action::Left)).unwrap();

    assert_eq!(action, Action::Right);
    let kinds: Vec<SubgoalKind> = bot.stack().iter().rev().map(|sg| sg.kind).collect();
    assert_eq!(kinds, vec![SubgoalKind::GoNextTo, SubgoalKind::Pickup]);
    let top = bot.stack().top().copied().unwrap();
    assert_eq!(top.target, Some(Target::Position(ball_pos)));
    assert_eq!(bot.subgoals_pushed(), 1);

    world.step(action);
    let rest = drive_from(&mut world, &mut bot, action, 5);
    assert_eq!(rest, vec![Action::Pickup]);
    assert_eq!(world.carrying().map(|obj| obj.kind), Some(ObjectKind::Ball));
}

// =============================================================================
// Failures
// =============================================================================

#[test]
fn opening_a_box_fails_the_next_replan() {
    let mut world = parse_map(
        "
WWWWWWWWWW
WW>>BG..WW
WWWWWWWWWW
",
    )
    .unwrap();
    let mut bot = BabyBot::new(&world, PlannerConfig::default());
    assert_eq!(bot.replan(&world, None).unwrap(), Action::Done);
    world.step(Action::Toggle);
    assert!(world.cell(GridPosition::new(2, 1)).is_none());
    let err = bot.replan(&world, Some(Action::Toggle)).unwrap_err();
    assert_eq!(
        err,
        PlannerError::BoxOpened {
            position: GridPosition::new(2, 1)
        }
    );
}

#[test]
fn toggling_a_door_is_not_a_box_opening() {
    let mut world = parse_map(
        "
WWWWWWWWWW
WW>>DG..WW
WWWWWWWWWW
",
    )
    .unwrap();
    let mut bot = BabyBot::new(&world, PlannerConfig::default());
    bot.replan(&world, None).unwrap();
    world.step(Action::Toggle);
    assert!(bot.replan(&world, Some(Action::Toggle)).is_ok());
}

#[test]
fn missing_target_without_doors_exhausts_exploration() {
    let mut world = parse_map(
        "
WWWWWWWWWWWW
WW>>....OBWW
WW........WW
WWWWWWWWWWWW
",
    )
    .unwrap();
    // The only door is already open; it is never an exploration target.
    let mut bot = mission_bot(
        &world,
        &Instruction::go_to(desc(ObjectKind::Ball, Color::Purple)),
        PlannerConfig::default(),
    );
    assert_eq!(drive(&mut world, &mut bot, 10).unwrap_err(), PlannerError::NothingToExplore);
}

#[test]
fn replanning_cap_reports_stuck() {
    let world = parse_map(
        "
WWWWWWWWWW
WW>>..ARWW
WWWWWWWWWW
",
    )
    .unwrap();
    let config = PlannerConfig {
        max_replan_iterations: 1,
        ..PlannerConfig::default()
    };
    // Facing nothing useful: the first subgoal pops without acting, which
    // needs a second iteration.
    let mut bot = BabyBot::with_plan(&world, config, [Subgoal::close(), Subgoal::drop()]);
    assert_eq!(
        bot.replan(&world, None).unwrap_err(),
        PlannerError::Stuck { iterations: 1 }
    );
}

// =============================================================================
// Exploration
// =============================================================================

#[test]
fn hidden_target_is_found_by_opening_a_door() {
    let mut world = parse_map(
        "
WWWWWWWWWWWWWWWWWWWW
WW..<<DB........ARWW
WWWWWWWWWWWWWWWWWWWW
",
    )
    .unwrap();
    let instruction = Instruction::go_to(desc(ObjectKind::Ball, Color::Red));
    world.set_mission(instruction.clone());
    let config = PlannerConfig {
        observability: Observability::Partial,
        ..PlannerConfig::default()
    };
    let mut bot = mission_bot(&world, &instruction, config);

    let actions = drive(&mut world, &mut bot, 50).unwrap();

    let mut expected = vec![Action::Right, Action::Right, Action::Toggle];
    expected.extend([Action::Forward; 5]);
    assert_eq!(actions, expected);
    assert!(world.mission_succeeded());
    assert!(world.cell(GridPosition::new(3, 1)).unwrap().is_open);
}

#[test]
fn exploration_prefers_an_unlocked_door() {
    let world = parse_map(
        "
WWWWWWWWWWWWWW
WW>>..LR....WW
WW....WW....WW
WW....DB....WW
WWWWWWWWWWWWWW
",
    )
    .unwrap();
    let unlocked = *world.cell(GridPosition::new(3, 3)).unwrap();
    let mut bot = mission_bot(
        &world,
        &Instruction::go_to(desc(ObjectKind::Ball, Color::Purple)),
        PlannerConfig::default(),
    );

    bot.replan(&world, None).unwrap();

    // The locked red door is closer; the blue one is chosen anyway.
    let plan: Vec<Subgoal> = bot.stack().iter().rev().copied().collect();
    assert_eq!(plan.len(), 3);
    assert_eq!(
        plan[0],
        Subgoal::go_next_to(Target::Object(unlocked.id), Some(Reason::Open))
    );
    assert_eq!(plan[1], Subgoal::open(None));
    assert_eq!(plan[2].kind, SubgoalKind::GoNextTo);
}

// =============================================================================
// Plan control
// =============================================================================

#[test]
fn reset_discards_the_previous_plan() {
    let mut world = parse_map(
        "
WWWWWWWWWWWW
WW>>....ARWW
WW........WW
WWWWWWWWWWWW
",
    )
    .unwrap();
    let mut bot = mission_bot(
        &world,
        &Instruction::go_to(desc(ObjectKind::Ball, Color::Red)),
        PlannerConfig::default(),
    );
    let plan = parse_subgoal_plan(&["(GoNextToSubgoal, (1, 2))"]).unwrap();
    bot.reset(plan);
    assert_eq!(bot.stack().len(), 1);
    assert_eq!(bot.subgoals_pushed(), 0);

    let actions = drive(&mut world, &mut bot, 10).unwrap();
    assert_eq!(actions, vec![Action::Right]);
    assert_eq!(world.agent_pos(), GridPosition::new(1, 1));
    assert_eq!(world.front_pos(), GridPosition::new(1, 2));
}

#[test]
fn pickup_in_front_takes_one_tick() {
    let mut world = parse_map(
        "
WWWWWWWWWW
WW>>AR..WW
WWWWWWWWWW
",
    )
    .unwrap();
    let mut bot = BabyBot::with_plan(&world, PlannerConfig::default(), [Subgoal::pickup()]);
    let actions = drive(&mut world, &mut bot, 5).unwrap();
    assert_eq!(actions, vec![Action::Pickup]);
    assert_eq!(world.carrying().map(|obj| obj.kind), Some(ObjectKind::Ball));
}

#[test]
fn go_next_to_finishes_exactly_when_facing_the_target() {
    for col in 1..5 {
        for row in 1..4 {
            let target = GridPosition::new(col, row);
            let mut world = GridWorld::walled(6, 5).unwrap();
            world.place_agent(GridPosition::new(2, 2), Direction::East).unwrap();
            let mut bot = BabyBot::with_plan(
                &world,
                PlannerConfig::default(),
                [Subgoal::go_next_to(Target::Position(target), None)],
            );

            let mut last = None;
            let mut finished = false;
            for _ in 0..40 {
                let facing = world.front_pos() == target;
                let action = bot.replan(&world, last).unwrap();
                assert_eq!(action == Action::Done, facing, "target {target}");
                if action == Action::Done {
                    finished = true;
                    break;
                }
                world.step(action);
                last = Some(action);
            }
            assert!(finished, "never reached {target}");
        }
    }
}

// =============================================================================
// Pathfinder optimality
// =============================================================================

/// Plain 4-connected BFS distance over non-wall cells.
fn reference_distance(world: &GridWorld, from: GridPosition, to: GridPosition) -> Option<usize> {
    let mut seen = vec![false; usize::try_from(world.width() * world.height()).unwrap()];
    let index = |pos: GridPosition| usize::try_from(pos.row * world.width() + pos.col).unwrap();
    let mut queue = VecDeque::from([(from, 0_usize)]);
    seen[index(from)] = true;
    while let Some((pos, dist)) = queue.pop_front() {
        if pos == to {
            return Some(dist);
        }
        for next in pos.neighbors() {
            if world.contains(next) && world.cell(next).is_none() && !seen[index(next)] {
                seen[index(next)] = true;
                queue.push_back((next, dist + 1));
            }
        }
    }
    None
}

#[test]
fn free_paths_are_shortest() {
    let mut rng = StdRng::seed_from_u64(2024);
    for _ in 0..20 {
        let mut world = GridWorld::walled(9, 9).unwrap();
        for col in 1..8 {
            for row in 1..8 {
                if (col, row) != (1, 1) && rng.random_bool(0.3) {
                    world.place(GridPosition::new(col, row), WorldObject::wall()).unwrap();
                }
            }
        }
        world.place_agent(GridPosition::new(1, 1), Direction::East).unwrap();
        let mask = VisibilityMask::new(9, 9, true);
        let mut stats = BfsStats::default();

        for col in 1..8 {
            for row in 1..8 {
                let target = GridPosition::new(col, row);
                if world.cell(target).is_some() {
                    continue;
                }
                let accept = |pos: GridPosition, _: Option<&WorldObject>| pos == target;
                let found = shortest_path(&world, &mask, &mut stats, &accept, Blockers::Avoid, None);
                let expected = reference_distance(&world, world.agent_pos(), target);
                assert_eq!(found.map(|path| path.len()), expected, "target {target}");
            }
        }
    }
}
