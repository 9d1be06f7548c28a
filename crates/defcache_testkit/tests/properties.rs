//! Property tests: indexed lookups agree with a linear scan.

use defcache_core::{IndexConfig, IndirectIndex, InvalidationBroadcaster, InvalidationCause};
use defcache_defs::{DataManager, ItemDefinition, ItemStack, TagFile, TagId, TagRegistry};
use defcache_testkit::prelude::*;
use proptest::prelude::*;
use std::sync::Arc;

fn manager_with<D: ItemDefinition>(
    tag_files: Vec<(TagId, TagFile)>,
    definitions: Vec<D>,
) -> (Arc<TagRegistry>, DataManager<D>) {
    let broadcaster = InvalidationBroadcaster::shared();
    let tags = Arc::new(TagRegistry::new(&broadcaster));
    tags.replace(tag_files).unwrap();
    let manager = DataManager::new(&broadcaster, &tags);
    manager.replace(definitions, InvalidationCause::DataReload).unwrap();
    (tags, manager)
}

/// Every pool item resolves to the first definition a linear scan accepts.
fn assert_matches_linear_scan<D: ItemDefinition>(tags: &TagRegistry, manager: &DataManager<D>) {
    let snapshot = tags.snapshot();
    let values = manager.values().unwrap();
    for raw in ITEM_POOL {
        for count in [0, 1] {
            let stack = ItemStack::new(item(raw), count);
            let expected = values
                .iter()
                .find(|d| d.matches(&stack, &snapshot))
                .map(|d| d.id().to_string());
            let found = manager.get(&stack).unwrap().map(|d| d.id().to_string());
            assert_eq!(found, expected, "lookup of {raw} x{count}");

            let all: Vec<String> = manager
                .get_all(&stack)
                .unwrap()
                .iter()
                .map(|d| d.id().to_string())
                .collect();
            let all_expected: Vec<String> = values
                .iter()
                .filter(|d| d.matches(&stack, &snapshot))
                .map(|d| d.id().to_string())
                .collect();
            assert_eq!(all, all_expected, "all candidates of {raw}");
        }
    }
}

/// Every item a definition accepts finds that definition.
fn assert_extractor_contract<D: ItemDefinition>(tags: &TagRegistry, manager: &DataManager<D>) {
    let snapshot = tags.snapshot();
    for definition in manager.values().unwrap().iter() {
        for accepted in definition.valid_items(&snapshot) {
            let stack = ItemStack::of(accepted);
            assert!(definition.matches(&stack, &snapshot));
            let found = manager.get_all(&stack).unwrap();
            assert!(
                found.iter().any(|d| d.id() == definition.id()),
                "{} not found through {}",
                definition.id(),
                stack.item
            );
        }
    }
}

type Keyed = (usize, Vec<u8>);

/// Every key finds exactly the records listing it, in source order.
fn assert_keyed_lookups(index: &IndirectIndex<u8, Keyed>, records: &[Keyed]) {
    for key in 0u8..8 {
        let found: Vec<usize> = index.get_all(&key).unwrap().iter().map(|(id, _)| *id).collect();
        let expected: Vec<usize> = records
            .iter()
            .filter(|(_, keys)| keys.contains(&key))
            .map(|(id, _)| *id)
            .collect();
        assert_eq!(found, expected, "key {key}");
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn fuel_lookup_agrees_with_scan(
        tag_files in tag_files_strategy(),
        fuels in fuels_strategy(12),
    ) {
        let (tags, manager) = manager_with(tag_files, fuels);
        assert_matches_linear_scan(&tags, &manager);
        assert_extractor_contract(&tags, &manager);
    }

    #[test]
    fn fertilizer_lookup_agrees_with_scan(
        tag_files in tag_files_strategy(),
        fertilizers in fertilizers_strategy(12),
    ) {
        let (tags, manager) = manager_with(tag_files, fertilizers);
        assert_matches_linear_scan(&tags, &manager);
        assert_extractor_contract(&tags, &manager);
    }

    #[test]
    fn heating_lookup_agrees_with_scan(
        tag_files in tag_files_strategy(),
        recipes in heating_strategy(12),
    ) {
        let (tags, manager) = manager_with(tag_files, recipes);
        assert_matches_linear_scan(&tags, &manager);
        assert_extractor_contract(&tags, &manager);
    }

    #[test]
    fn tag_reload_is_observed(
        before in tag_files_strategy(),
        after in tag_files_strategy(),
        fuels in fuels_strategy(8),
    ) {
        let (tags, manager) = manager_with(before, fuels);
        assert_matches_linear_scan(&tags, &manager);

        tags.replace(after).unwrap();
        assert_matches_linear_scan(&tags, &manager);
    }

    #[test]
    fn sync_packet_preserves_lookups(
        tag_files in tag_files_strategy(),
        fuels in fuels_strategy(8),
    ) {
        let (server_tags, server) = manager_with(tag_files.clone(), fuels);
        let (client_tags, client) = manager_with::<defcache_defs::Fuel>(tag_files, Vec::new());

        client.apply_sync(&server.encode_sync().unwrap()).unwrap();
        for raw in ITEM_POOL {
            let query = stack(raw);
            let on_server = server.get(&query).unwrap().map(|d| d.id().to_string());
            let on_client = client.get(&query).unwrap().map(|d| d.id().to_string());
            prop_assert_eq!(on_server, on_client);
        }
        assert_matches_linear_scan(&server_tags, &server);
        assert_matches_linear_scan(&client_tags, &client);
    }

    #[test]
    fn source_swap_is_seen_after_notify(
        before in keyed_records_strategy(16),
        after in keyed_records_strategy(16),
    ) {
        let broadcaster = InvalidationBroadcaster::shared();
        let source = CountingSource::new(before.clone());
        let index = IndirectIndex::new(
            &broadcaster,
            IndexConfig::named("keyed"),
            |(_, keys): &Keyed| keys.clone(),
            source.accessor(),
        );

        assert_keyed_lookups(&index, &before);
        prop_assert_eq!(source.calls(), 1);

        source.set(after.clone());
        broadcaster.notify(InvalidationCause::DataReload);
        assert_keyed_lookups(&index, &after);
        prop_assert_eq!(source.calls(), 2);
    }

    #[test]
    fn generated_ids_parse_back(id in resource_id_strategy(), stack in item_stack_strategy()) {
        prop_assert_eq!(defcache_defs::ItemId::parse(id.as_str()).unwrap(), id);
        prop_assert_eq!(stack.is_empty(), stack.count == 0);
    }
}

#[test]
fn stress_reload_under_reads_is_clean() {
    let result = run_reload_under_reads(&StressConfig::default());
    assert!(result.is_clean(), "{result:?}");
}
