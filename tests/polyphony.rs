use midisynth::{
    engine::allocator::StealPolicy,
    io::AudioOutput,
    synth::VoiceState,
    EngineConfig, SynthEngine,
};

const BLOCK: usize = 64;

fn engine(voices: usize, policy: StealPolicy) -> (SynthEngine, midisynth::SynthHandle) {
    SynthEngine::new(EngineConfig {
        voices,
        steal_policy: policy,
        channels: 1,
        ..EngineConfig::default()
    })
    .unwrap()
}

fn step(engine: &mut SynthEngine) {
    let mut output = AudioOutput::new(1, BLOCK);
    engine.process_block(&mut output, BLOCK);
}

fn notes(engine: &SynthEngine) -> Vec<Option<u8>> {
    engine.voice_states().map(|s| s.note).collect()
}

#[test]
fn one_note_past_capacity_steals_the_oldest() {
    let (mut engine, mut handle) = engine(4, StealPolicy::Oldest);
    for note in [60, 62, 64, 65] {
        handle.note_on(note, 100, 0).unwrap();
        step(&mut engine);
    }
    assert_eq!(engine.active_voice_count(), 4);

    handle.note_on(67, 100, 0).unwrap();
    step(&mut engine);

    assert_eq!(engine.active_voice_count(), 4);
    assert_eq!(notes(&engine), vec![Some(67), Some(62), Some(64), Some(65)]);
}

#[test]
fn stealing_is_deterministic_across_runs() {
    let run = || {
        let (mut engine, mut handle) = engine(4, StealPolicy::Oldest);
        for (i, note) in [48, 52, 55, 59, 62, 64, 67, 71, 52].into_iter().enumerate() {
            handle.note_on(note, 90, (i * 7) as u32).unwrap();
            if i % 3 == 0 {
                handle.note_off(note, 40).unwrap();
            }
            step(&mut engine);
        }
        notes(&engine)
    };

    assert_eq!(run(), run());
}

#[test]
fn released_voice_is_stolen_before_held_ones() {
    let (mut engine, mut handle) = engine(3, StealPolicy::Oldest);
    for note in [60, 64, 67] {
        handle.note_on(note, 100, 0).unwrap();
    }
    step(&mut engine);
    handle.note_off(67, 0).unwrap();
    step(&mut engine);

    handle.note_on(72, 100, 0).unwrap();
    step(&mut engine);

    assert_eq!(notes(&engine), vec![Some(60), Some(64), Some(72)]);
}

#[test]
fn quietest_policy_steals_the_softest_note() {
    let (mut engine, mut handle) = engine(3, StealPolicy::Quietest);
    handle.note_on(60, 127, 0).unwrap();
    handle.note_on(64, 20, 0).unwrap();
    handle.note_on(67, 127, 0).unwrap();
    for _ in 0..8 {
        step(&mut engine);
    }

    handle.note_on(72, 100, 0).unwrap();
    step(&mut engine);

    assert_eq!(notes(&engine), vec![Some(60), Some(72), Some(67)]);
}

#[test]
fn all_notes_off_lets_every_voice_ring_out() {
    let (mut engine, mut handle) = engine(4, StealPolicy::Oldest);
    for note in [60, 64, 67, 71] {
        handle.note_on(note, 100, 0).unwrap();
    }
    step(&mut engine);
    handle.all_notes_off().unwrap();
    step(&mut engine);

    assert!(engine
        .voice_states()
        .all(|s| s.state == VoiceState::Releasing));

    for _ in 0..(48_000 / BLOCK) {
        step(&mut engine);
    }
    assert_eq!(engine.active_voice_count(), 0);
    assert!(notes(&engine).iter().all(Option::is_none));
}

#[test]
fn reset_frees_every_voice() {
    let (mut engine, mut handle) = engine(2, StealPolicy::Oldest);
    handle.note_on(60, 100, 0).unwrap();
    handle.note_on(62, 100, 0).unwrap();
    step(&mut engine);

    engine.reset();

    assert_eq!(engine.active_voice_count(), 0);
}
