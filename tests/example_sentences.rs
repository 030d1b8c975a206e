use namebook::{find_example_sentences, ExampleSentence};

#[test]
fn long_sentence_beats_trivial_fragment() {
    let paragraphs = ["小さなアツシは今日も元気に笑っていた。アツシ。"];
    let examples = find_example_sentences(["アツシ"], paragraphs);
    assert_eq!(
        examples["アツシ"],
        ExampleSentence::Found("小さな**アツシ**は今日も元気に笑っていた。".to_string())
    );
}

#[test]
fn continuation_lines_form_one_sentence() {
    let paragraphs = ["レンは王都の", "北にある大きな森の奥で静かに暮らしていた。"];
    let examples = find_example_sentences(["レン"], paragraphs);
    assert_eq!(
        examples["レン"].text(),
        Some("**レン**は王都の北にある大きな森の奥で静かに暮らしていた。")
    );
}

#[test]
fn every_name_gets_an_entry() {
    let paragraphs = ["「待って！」とユキが叫んだ。", "二階堂(にかいどう)は答えなかった。"];
    let examples = find_example_sentences(["ユキ", "にかいどう", "イリス"], paragraphs);

    assert_eq!(examples.len(), 3);
    assert_eq!(examples["ユキ"], ExampleSentence::Fallback("と**ユキ**が叫んだ。".to_string()));
    assert_eq!(examples["にかいどう"], ExampleSentence::Missing);
    assert_eq!(examples["イリス"].render("イリス"), "No example sentence for **イリス**.");
}
