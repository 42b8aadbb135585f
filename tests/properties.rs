//! Property tests for the resolver, abbreviation matching and the gate

use makedbg::gate::{check, Verdict};
use makedbg::interactive::is_abbrev_of;
use makedbg::{BreakpointFlags, CommandRegistry, DebugSession, Error, InvocationFrame, StopReason};
use proptest::prelude::*;

fn any_reason() -> impl Strategy<Value = StopReason> {
    prop_oneof![
        Just(StopReason::BeforePrereq),
        Just(StopReason::AfterPrereq),
        Just(StopReason::AfterCommand),
        Just(StopReason::GoalUpdated),
        Just(StopReason::ReadMakefile),
        Just(StopReason::ErrorHit),
        Just(StopReason::StepHit),
        Just(StopReason::Explicit),
        Just(StopReason::NotGiven),
    ]
}

fn any_flags() -> impl Strategy<Value = BreakpointFlags> {
    (0u8..16).prop_map(BreakpointFlags::from_bits_truncate)
}

proptest! {
    #[test]
    fn resolving_never_panics(line in "\\PC{0,24}") {
        let registry = CommandRegistry::global().unwrap();
        match registry.resolve(&line) {
            Ok((command, args)) => {
                prop_assert!(registry.lookup(command.long_name).is_some());
                prop_assert_eq!(args, args.trim());
            }
            Err(e) => prop_assert!(matches!(e, Error::UnknownCommand(_))),
        }
    }

    #[test]
    fn registered_names_resolve_to_themselves(index in 0usize..31, args in "[a-z0-9 ]{0,12}") {
        let registry = CommandRegistry::global().unwrap();
        let command = &registry.commands()[index];

        let line = format!("{} {}", command.long_name, args);
        let (by_name, rest) = registry.resolve(&line).unwrap();
        prop_assert_eq!(by_name.id, command.id);
        prop_assert_eq!(rest, args.trim());

        let line = format!("{} {}", command.short_code, args);
        let (by_code, _) = registry.resolve(&line).unwrap();
        prop_assert_eq!(by_code.id, command.id);
    }

    #[test]
    fn abbreviation_needs_minimum_length(
        keyword in "[a-z][a-z-]{0,14}",
        cut in 0usize..16,
        min in 1usize..6,
    ) {
        let cut = cut.min(keyword.len());
        let token = &keyword[..cut];
        prop_assert_eq!(is_abbrev_of(token, &keyword, min), cut >= min);

        let longer = format!("{}x", keyword);
        prop_assert!(!is_abbrev_of(&longer, &keyword, min));
    }

    #[test]
    fn force_quit_gate_is_inert(
        errcode in -3i32..4,
        reason in any_reason(),
        flags in any_flags(),
        stepping in 0u32..5,
        nexting in 0u32..5,
        with_frame in any::<bool>(),
    ) {
        let mut session = DebugSession::default();
        session.force_quit();
        session.stepping = stepping;
        session.nexting = nexting;
        let before = session.last_stop_reason;
        let mut frame = InvocationFrame::new("t").with_flags(flags);

        let target = if with_frame { Some(&mut frame) } else { None };
        prop_assert_eq!(check(&mut session, target, errcode, reason), Verdict::Continue);

        prop_assert!(session.is_force_quit());
        prop_assert_eq!(session.stepping, stepping);
        prop_assert_eq!(session.nexting, nexting);
        prop_assert_eq!(session.last_stop_reason, before);
        prop_assert_eq!(frame.flags, flags);
    }

    #[test]
    fn step_count_runs_down_to_a_stop(count in 2u32..40, reason in any_reason()) {
        let mut session = DebugSession::default();
        session.stepping = count;
        let mut frame = InvocationFrame::new("t");

        for _ in 1..count {
            prop_assert_eq!(check(&mut session, Some(&mut frame), 0, reason), Verdict::Continue);
        }
        prop_assert_eq!(session.stepping, 1);
        prop_assert_eq!(check(&mut session, Some(&mut frame), 0, reason), Verdict::Stop);
    }
}
