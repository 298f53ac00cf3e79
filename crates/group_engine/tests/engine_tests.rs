//! End-to-end engine tests: the full expense -> ledger -> suggestion ->
//! settlement workflows a host service drives.

use std::sync::Arc;

use chrono::Utc;
use core_kernel::{Currency, GroupId, MemberId, Money};
use domain_expense::{PercentShare, SplitSpec};
use group_engine::{EngineConfig, ErrorKind, FixedRates, GroupRef, LedgerEngine, NewExpense};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use test_utils::{
    assert_all_settled, assert_group_balanced, assert_shares_reconcile, MemberFixtures,
    MoneyFixtures, NewExpenseBuilder,
};

fn engine() -> LedgerEngine {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let rates = FixedRates::new().with_rate(Currency::EUR, Currency::USD, dec!(1.10));
    LedgerEngine::new(Arc::new(rates))
}

fn equal_draft(
    group: &GroupRef,
    payer: MemberId,
    participants: Vec<MemberId>,
    amount: Money,
) -> NewExpense {
    NewExpense {
        group_id: group.id,
        paid_by: payer,
        amount,
        category: "shared".to_string(),
        description: None,
        date: Utc::now(),
        participants,
        split: SplitSpec::Equal,
    }
}

mod expense_workflows {
    use super::*;

    #[test]
    fn equal_split_of_one_hundred_across_three() {
        let engine = engine();
        let group = GroupRef::new(GroupId::new(), Currency::USD);
        let members: Vec<MemberId> = (0..3).map(|_| MemberId::new_user()).collect();

        let expense = engine
            .add_expense(
                &group,
                equal_draft(
                    &group,
                    members[0],
                    members.clone(),
                    Money::new(dec!(100.00), Currency::USD),
                ),
            )
            .unwrap();

        let shares: Vec<Decimal> = expense.split.iter().map(|l| l.amount.amount()).collect();
        assert_eq!(shares, vec![dec!(33.34), dec!(33.33), dec!(33.33)]);
        assert_shares_reconcile(&expense.split, &expense.converted_amount);
    }

    #[test]
    fn mixed_party_trip_stays_balanced() {
        let engine = engine();
        let group = GroupRef::new(GroupId::new(), Currency::USD);
        let party = MemberFixtures::mixed_party(2, 2);

        engine
            .add_expense(
                &group,
                NewExpenseBuilder::new()
                    .with_group(group.id)
                    .with_participants(party.clone())
                    .with_amount(MoneyFixtures::dinner())
                    .with_category("dinner")
                    .build(),
            )
            .unwrap();
        engine
            .add_expense(
                &group,
                NewExpenseBuilder::new()
                    .with_group(group.id)
                    .with_participants(party.clone())
                    .with_payer(party[3])
                    .with_amount(MoneyFixtures::eur_hotel())
                    .with_category("lodging")
                    .build(),
            )
            .unwrap();

        let balances = engine.get_balances(group.id);
        assert_eq!(balances.len(), 4);
        assert_group_balanced(&balances, dec!(0.02));

        // dinner payer: fronted 120.00, owes 30.00 + 68.75 in shares
        let payer_balance = balances.iter().find(|b| b.member == party[0]).unwrap();
        test_utils::assert_money_approx_eq(
            &payer_balance.as_money(),
            &MoneyFixtures::usd(dec!(21.25)),
            Money::EPSILON,
        );
    }

    #[test]
    fn foreign_currency_expense_lands_in_base_currency() {
        let engine = engine();
        let group = GroupRef::new(GroupId::new(), Currency::USD);
        let (a, b) = (MemberId::new_user(), MemberId::new_friend());

        let expense = engine
            .add_expense(
                &group,
                equal_draft(&group, a, vec![a, b], Money::new(dec!(50.00), Currency::EUR)),
            )
            .unwrap();

        assert_eq!(
            expense.converted_amount,
            Money::new(dec!(55.00), Currency::USD)
        );
        assert_eq!(expense.fx_rate, dec!(1.10));

        let balances = engine.get_balances(group.id);
        assert!(balances.iter().all(|b| b.currency == Currency::USD));
        assert_eq!(
            engine
                .get_balances(group.id)
                .iter()
                .find(|bal| bal.member == a)
                .unwrap()
                .amount,
            dec!(27.50)
        );
    }

    #[test]
    fn bad_percentage_split_is_rejected_with_no_ledger_effect() {
        let engine = engine();
        let group = GroupRef::new(GroupId::new(), Currency::USD);
        let (a, b) = (MemberId::new_user(), MemberId::new_user());

        let mut draft = equal_draft(
            &group,
            a,
            vec![a, b],
            Money::new(dec!(100.00), Currency::USD),
        );
        draft.split = SplitSpec::Percentage(vec![
            PercentShare {
                member: a,
                percent: dec!(66.0),
            },
            PercentShare {
                member: b,
                percent: dec!(33.0),
            },
        ]);

        let err = engine.add_expense(&group, draft).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(engine.get_balances(group.id).is_empty());
    }

    #[test]
    fn reverse_expense_restores_balances() {
        let engine = engine();
        let group = GroupRef::new(GroupId::new(), Currency::USD);
        let (a, b) = (MemberId::new_user(), MemberId::new_user());

        let keep = engine
            .add_expense(
                &group,
                equal_draft(&group, a, vec![a, b], Money::new(dec!(40.00), Currency::USD)),
            )
            .unwrap();
        let mut undone = engine
            .add_expense(
                &group,
                equal_draft(&group, b, vec![a, b], Money::new(dec!(10.00), Currency::USD)),
            )
            .unwrap();

        undone.deactivate();
        engine.reverse_expense(&undone).unwrap();

        // only the first expense should remain in effect
        let balances = engine.get_balances(group.id);
        let of = |m: MemberId| balances.iter().find(|bal| bal.member == m).unwrap().amount;
        assert_eq!(of(a), dec!(20.00));
        assert_eq!(of(b), dec!(-20.00));
        assert!(keep.is_active);
    }

    #[test]
    fn new_members_materialize_lazily() {
        let engine = engine();
        let group = GroupRef::new(GroupId::new(), Currency::USD);
        let (a, b) = (MemberId::new_user(), MemberId::new_user());

        engine
            .add_expense(
                &group,
                equal_draft(&group, a, vec![a, b], Money::new(dec!(20.00), Currency::USD)),
            )
            .unwrap();
        assert_eq!(engine.get_balances(group.id).len(), 2);

        // a member appended to the group later simply shows up on first
        // reference
        let late = MemberId::new_friend();
        engine
            .add_expense(
                &group,
                equal_draft(
                    &group,
                    late,
                    vec![a, late],
                    Money::new(dec!(10.00), Currency::USD),
                ),
            )
            .unwrap();
        assert_eq!(engine.get_balances(group.id).len(), 3);
    }
}

mod settlement_workflows {
    use super::*;

    /// Builds the {A: +60, B: -20, C: -40} snapshot from real expenses.
    fn sixty_twenty_forty(
        engine: &LedgerEngine,
        group: &GroupRef,
    ) -> (MemberId, MemberId, MemberId) {
        let (a, b, c) = (
            MemberId::new_user(),
            MemberId::new_user(),
            MemberId::new_user(),
        );

        // A pays 60 split across B (20) and C (40)
        let mut draft = equal_draft(
            group,
            a,
            vec![b, c],
            Money::new(dec!(60.00), Currency::USD),
        );
        draft.split = SplitSpec::Custom(vec![
            domain_expense::CustomShare {
                member: b,
                amount: Money::new(dec!(20.00), Currency::USD),
            },
            domain_expense::CustomShare {
                member: c,
                amount: Money::new(dec!(40.00), Currency::USD),
            },
        ]);
        engine.add_expense(group, draft).unwrap();
        (a, b, c)
    }

    #[test]
    fn greedy_suggestions_match_the_canonical_example() {
        let engine = engine();
        let group = GroupRef::new(GroupId::new(), Currency::USD);
        let (a, b, c) = sixty_twenty_forty(&engine, &group);

        let suggestions = engine.suggest_settlements(group.id);

        assert_eq!(suggestions.len(), 2);
        assert_eq!(suggestions[0].from, c);
        assert_eq!(suggestions[0].to, a);
        assert_eq!(suggestions[0].amount.amount(), dec!(40.00));
        assert_eq!(suggestions[1].from, b);
        assert_eq!(suggestions[1].to, a);
        assert_eq!(suggestions[1].amount.amount(), dec!(20.00));
    }

    #[test]
    fn executing_suggestions_settles_everyone() {
        let engine = engine();
        let group = GroupRef::new(GroupId::new(), Currency::USD);
        sixty_twenty_forty(&engine, &group);

        for payment in engine.suggest_settlements(group.id) {
            let settlement = engine
                .create_settlement(&group, payment.from, payment.to, payment.amount)
                .unwrap();
            let completed = engine.complete_settlement(settlement.id).unwrap();
            test_utils::assert_settlement_completed(&completed);
        }

        assert_all_settled(&engine.get_balances(group.id));
        assert!(engine.suggest_settlements(group.id).is_empty());
    }

    #[test]
    fn completion_is_idempotent_in_effect() {
        let engine = engine();
        let group = GroupRef::new(GroupId::new(), Currency::USD);
        let (a, b, _) = sixty_twenty_forty(&engine, &group);

        let settlement = engine
            .create_settlement(&group, b, a, Money::new(dec!(20.00), Currency::USD))
            .unwrap();
        engine.complete_settlement(settlement.id).unwrap();

        let after_first: Vec<_> = engine.get_balances(group.id);

        let err = engine.complete_settlement(settlement.id).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);
        assert_eq!(engine.get_balances(group.id), after_first);
    }

    #[test]
    fn pending_and_cancelled_settlements_never_move_balances() {
        let engine = engine();
        let group = GroupRef::new(GroupId::new(), Currency::USD);
        let (a, b, _) = sixty_twenty_forty(&engine, &group);

        let before = engine.get_balances(group.id);
        let settlement = engine
            .create_settlement(&group, b, a, Money::new(dec!(20.00), Currency::USD))
            .unwrap();
        assert_eq!(engine.get_balances(group.id), before);

        engine.cancel_settlement(settlement.id).unwrap();
        assert_eq!(engine.get_balances(group.id), before);

        // a cancelled settlement is terminal
        let err = engine.complete_settlement(settlement.id).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);
    }

    #[test]
    fn unknown_settlement_id_is_not_found() {
        let engine = engine();
        let err = engine
            .complete_settlement(core_kernel::SettlementId::new())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn settlement_records_are_listed_per_group() {
        let engine = engine();
        let group = GroupRef::new(GroupId::new(), Currency::USD);
        let (a, b, _) = sixty_twenty_forty(&engine, &group);

        let settlement = engine
            .create_settlement(&group, b, a, Money::new(dec!(5.00), Currency::USD))
            .unwrap();

        let listed = engine.settlements_for_group(group.id);
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, settlement.id);
        assert_eq!(
            engine.settlement(settlement.id).unwrap().status,
            group_engine::SettlementStatus::Pending
        );
    }
}

mod properties {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Interleaving expenses with completed settlements through the
        /// facade keeps the group zero-sum within the accumulated
        /// tolerance.
        #[test]
        fn mixed_operations_preserve_zero_sum(
            members in test_utils::member_pool_strategy(4),
            ops in proptest::collection::vec(
                (0usize..4usize, 1usize..=4usize, 1i64..200_000i64, any::<bool>()),
                1..20
            )
        ) {
            let engine = engine();
            let group = GroupRef::new(GroupId::new(), Currency::USD);
            let mut op_count = 0u32;

            for (payer, take, amount_minor, settle_after) in ops {
                let participants = members.iter().copied().take(take).collect();
                engine
                    .add_expense(
                        &group,
                        equal_draft(
                            &group,
                            members[payer],
                            participants,
                            Money::from_minor(amount_minor, Currency::USD),
                        ),
                    )
                    .unwrap();
                op_count += 1;

                if settle_after {
                    if let Some(payment) = engine.suggest_settlements(group.id).first() {
                        let settlement = engine
                            .create_settlement(&group, payment.from, payment.to, payment.amount)
                            .unwrap();
                        engine.complete_settlement(settlement.id).unwrap();
                        op_count += 1;
                    }
                }
            }

            let total: Decimal = engine
                .get_balances(group.id)
                .iter()
                .map(|b| b.amount)
                .sum();
            let bound = dec!(0.01) * Decimal::from(op_count);
            prop_assert!(total.abs() <= bound, "sum {} exceeds {}", total, bound);
        }
    }
}

mod configuration {
    use super::*;

    #[test]
    fn custom_retry_bound_is_accepted() {
        let rates = FixedRates::new();
        let config = EngineConfig {
            max_conflict_retries: 8,
        };
        let engine = LedgerEngine::with_config(config, Arc::new(rates));

        let group = GroupRef::new(GroupId::new(), Currency::USD);
        let a = MemberId::new_user();
        engine
            .add_expense(
                &group,
                equal_draft(&group, a, vec![a], Money::new(dec!(5.00), Currency::USD)),
            )
            .unwrap();
        assert_eq!(engine.get_balances(group.id).len(), 1);
    }
}
