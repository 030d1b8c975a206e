use namebook::kana::toggle_kana;
use namebook::pipeline::aggregate::aggregate_records;
use namebook::{FragmentGuard, NamePipeline, PipelineConfig, Registry, RubyMap};
use proptest::prelude::*;

const NAMES: &[&str] = &[
    "ア", "あ", "アツ", "アツシ", "あつし", "アツシさん", "レン", "レン先生", "森", "もり", "サクラ", "さくら", "ルミナ",
];
const TAGS: &[&str] = &["人名", "地名", "男性", "女性", "術語", "騎士"];

fn mention() -> impl Strategy<Value = String> {
    (0..NAMES.len(), prop::sample::subsequence(TAGS.to_vec(), 0..=3)).prop_map(|(name, tags)| {
        format!("[{{'name': '{}', 'info': '{}'}}]", NAMES[name], tags.join("，"))
    })
}

fn ruby_pairs() -> impl Strategy<Value = Vec<(usize, usize)>> {
    prop::collection::vec((0..NAMES.len(), 0..NAMES.len()), 0..4)
}

fn config() -> impl Strategy<Value = PipelineConfig> {
    (0u64..6, 0usize..4, any::<bool>()).prop_map(|(count_floor, min_alias_size, either)| PipelineConfig {
        count_floor,
        min_alias_size,
        fragment_guard: if either { FragmentGuard::Either } else { FragmentGuard::Both },
        ..PipelineConfig::default()
    })
}

fn build(records: &[String]) -> Registry {
    let (registry, _) = aggregate_records(records.iter().enumerate().map(|(i, r)| (format!("chunk-{i}"), r.clone())));
    registry
}

fn ruby_of(pairs: &[(usize, usize)]) -> RubyMap {
    RubyMap::from_pairs(pairs.iter().map(|&(g, h)| (NAMES[g], NAMES[h])))
}

proptest! {
    #[test]
    fn refined_registry_has_integrity(
        records in prop::collection::vec(mention(), 0..60),
        pairs in ruby_pairs(),
        config in config(),
    ) {
        let output = NamePipeline::new(config).refine(build(&records), &ruby_of(&pairs));
        let violations = output.registry.check_integrity();
        prop_assert!(violations.is_empty(), "violations: {:?}", violations);
    }

    #[test]
    fn refine_is_deterministic(
        records in prop::collection::vec(mention(), 0..40),
        pairs in ruby_pairs(),
    ) {
        let pipeline = NamePipeline::new(PipelineConfig { count_floor: 1, ..PipelineConfig::default() });
        let ruby = ruby_of(&pairs);
        let first = pipeline.refine(build(&records), &ruby);
        let second = pipeline.refine(build(&records), &ruby);
        prop_assert_eq!(first.registry.to_artifact_json().unwrap(), second.registry.to_artifact_json().unwrap());
    }

    #[test]
    fn counts_never_shrink(records in prop::collection::vec(mention(), 1..40)) {
        let before = build(&records);
        let output = NamePipeline::new(PipelineConfig { count_floor: 0, min_alias_size: 0, ..PipelineConfig::default() })
            .refine(before.clone(), &RubyMap::new());
        for entry in &output.registry {
            let own = before.get(&entry.surface).map_or(0, |e| e.total_count);
            prop_assert!(entry.total_count >= own);
        }
    }

    #[test]
    fn kana_toggle_is_an_involution(s in "[ぁ-ゖァ-ヶ]{0,20}") {
        prop_assert_eq!(toggle_kana(&toggle_kana(&s)), s);
    }
}
