//! Property tests for the task store, view derivation, and utilities.

use proptest::prelude::*;
use std::collections::HashSet;
use tasklist::{
    Filter, MemoryKv, PersistenceAdapter, Priority, Task, TaskStore, ValidationError, filtered_sorted, generate_id,
    sanitize_text,
};

fn arb_priority() -> impl Strategy<Value = Priority> {
    prop_oneof![Just(Priority::High), Just(Priority::Medium), Just(Priority::Low)]
}

/// Stores built through the public operations, with a random completion mix.
fn arb_store() -> impl Strategy<Value = TaskStore> {
    prop::collection::vec(("[a-z][a-z ]{0,11}", arb_priority(), any::<bool>()), 0..30).prop_map(|specs| {
        specs
            .into_iter()
            .fold(TaskStore::default(), |store, (text, priority, completed)| {
                let store = store.create(&text, Some(priority)).unwrap();
                if completed {
                    let id = store.tasks().last().unwrap().id.clone();
                    store.toggle_completion(&id).unwrap()
                } else {
                    store
                }
            })
    })
}

fn id_set(tasks: &[&Task]) -> HashSet<String> {
    tasks.iter().map(|t| t.id.clone()).collect()
}

#[test]
fn test_generated_ids_are_unique() {
    let prefixes = ["task", "note", "t"];
    let ids: HashSet<String> = (0..10_000).map(|i| generate_id(prefixes[i % prefixes.len()])).collect();
    assert_eq!(ids.len(), 10_000);
}

proptest! {
    #[test]
    fn filters_partition_the_collection(store in arb_store()) {
        let tasks = store.tasks();
        let all = filtered_sorted(tasks, Filter::All);
        let active = filtered_sorted(tasks, Filter::Active);
        let completed = filtered_sorted(tasks, Filter::Completed);

        prop_assert_eq!(all.len(), active.len() + completed.len());

        let active_ids = id_set(&active);
        let completed_ids = id_set(&completed);
        prop_assert!(active_ids.is_disjoint(&completed_ids));

        let union: HashSet<String> = active_ids.union(&completed_ids).cloned().collect();
        prop_assert_eq!(union, id_set(&all));

        let counts = store.counts();
        prop_assert_eq!(counts.active, active.len());
        prop_assert_eq!(counts.completed, completed.len());
    }

    #[test]
    fn toggle_is_an_involution(store in arb_store(), pick in any::<prop::sample::Index>()) {
        prop_assume!(!store.is_empty());
        let id = store.tasks()[pick.index(store.tasks().len())].id.clone();

        let back = store.toggle_completion(&id).unwrap().toggle_completion(&id).unwrap();
        prop_assert_eq!(back, store);
    }

    #[test]
    fn sorted_view_is_priority_ordered_and_stable(store in arb_store()) {
        let position = |id: &str| store.tasks().iter().position(|t| t.id == id).unwrap();
        let view = filtered_sorted(store.tasks(), Filter::All);

        for pair in view.windows(2) {
            prop_assert!(pair[0].priority <= pair[1].priority);
            if pair[0].priority == pair[1].priority {
                prop_assert!(position(&pair[0].id) < position(&pair[1].id));
            }
        }
    }

    #[test]
    fn whitespace_text_is_rejected(store in arb_store(), text in r"[ \t\n]{0,10}") {
        prop_assert_eq!(store.create(&text, None), Err(ValidationError::EmptyText));
    }

    #[test]
    fn create_appends_one_trimmed_task(store in arb_store(), text in "[a-z]{1,10}", pad in " {0,3}") {
        let padded = format!("{pad}{text}{pad}");
        let next = store.create(&padded, None).unwrap();

        prop_assert_eq!(next.tasks().len(), store.tasks().len() + 1);
        prop_assert_eq!(&next.tasks()[..store.tasks().len()], store.tasks());
        prop_assert_eq!(&next.tasks().last().unwrap().text, &text);
    }

    #[test]
    fn sanitize_double_escapes_ampersands(text in "[a-z ]{0,5}&[a-z ]{0,5}") {
        let once = sanitize_text(&text);
        prop_assert_ne!(sanitize_text(&once), once);
    }

    #[test]
    fn persisted_collection_round_trips(store in arb_store()) {
        let mut adapter = PersistenceAdapter::new(MemoryKv::new());
        adapter.save("tasks", store.tasks()).unwrap();

        let loaded: Vec<Task> = adapter.load("tasks", Vec::new());
        prop_assert_eq!(loaded.as_slice(), store.tasks());
    }
}
