//! Retention policies observed through the public engine API.

use std::num::NonZeroUsize;

use pagerframe::{
    Engine,
    RetentionPolicy,
    sink::MemorySink,
    synth::FrameGenerator,
    transform::Identity,
};
use rstest::rstest;
use tokio_util::sync::CancellationToken;

fn policy(delay: bool, bound: usize) -> RetentionPolicy {
    let bound = NonZeroUsize::new(bound).expect("non-zero bound");
    if delay {
        RetentionPolicy::DelayBound(bound)
    } else {
        RetentionPolicy::CountBound(bound)
    }
}

#[rstest]
#[case(false, 1)]
#[case(false, 10)]
#[case(true, 1)]
#[case(true, 8)]
#[tokio::test]
async fn generated_traffic_is_fully_accounted_for(#[case] delay: bool, #[case] bound: usize) {
    let policy = policy(delay, bound);
    let mut engine = Engine::new(policy, Box::new(Identity), MemorySink::default());
    let mut generator = FrameGenerator::from_seed(42);

    let mut fragments = 0;
    for _ in 0..2_000 {
        let frame = generator.next_frame();
        engine.process_frame(frame).await.expect("memory sink");
        assert!(engine.store().len() <= bound);
        fragments += 1;
    }
    let drained = engine.drain().await.expect("drain");
    assert!(drained <= bound);
    assert!(engine.store().is_empty());

    let messages = engine.into_sink().into_messages();
    let rows: usize = messages.iter().map(|message| message.rows().len()).sum();
    assert_eq!(rows, fragments);
    let mut ids: Vec<u64> = messages.iter().map(|message| message.id().get()).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), messages.len());
}

#[tokio::test]
async fn delay_bound_counts_frames_from_first_fragment() {
    let mut engine = Engine::new(policy(true, 2), Box::new(Identity), MemorySink::default());
    let lines = "FLEX|3200/4|00.001.A|0000000001|LS|5|ALN|3.1.F|slow \n\
                 FLEX|3200/4|00.002.A|0000000001|LS|5|ALN|0.1.F|still \n\
                 FLEX|3200/4|00.003.A|0000000002|LS|3|NUM|1\n\
                 FLEX|3200/4|00.004.A|0000000001|LS|5|ALN|1.0.C|late\n";

    let summary = engine
        .run(lines.as_bytes(), &CancellationToken::new())
        .await
        .expect("run succeeds");

    assert_eq!(summary.evicted, 1);
    let texts: Vec<_> = engine
        .sink()
        .messages()
        .iter()
        .map(|message| message.text().to_owned())
        .collect();
    assert_eq!(texts, ["1", "slow still ", "late"]);
}
