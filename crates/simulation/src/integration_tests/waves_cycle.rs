use crate::config::{
    TSUNAMI_FILL_INJECTION, WAVE_ARRIVAL_TIMER, WAVE_RECEDE_TIMER, WAVE_WARNING_TIMER,
};
use crate::objects::WaterState;
use crate::test_harness::TestSettlement;
use crate::timers::TimerRegistry;
use crate::waves::{WavePhase, WaveState};

/// Compresses the cycle timers so a phase flips on the next tick.
fn hurry(sim: &mut TestSettlement, timer: &str) {
    sim.world()
        .resource_mut::<TimerRegistry>()
        .start(timer.to_string(), 0.05);
}

#[test]
fn test_full_wave_cycle_escalates_and_clears_latches() {
    let mut sim = TestSettlement::new();
    let ocean = sim.place("ocean", 5, 5).unwrap();
    let road = sim.place("road", 6, 5).unwrap();
    {
        let mut water = sim.world().get_mut::<WaterState>(ocean).unwrap();
        water.fill = 1.0;
        water.flooded = true;
    }
    let base_rate = sim.world().get::<WaterState>(road).unwrap().fill_rate;

    hurry(&mut sim, WAVE_WARNING_TIMER);
    sim.tick(1);
    assert_eq!(sim.resource::<WaveState>().phase, WavePhase::Warned);

    hurry(&mut sim, WAVE_ARRIVAL_TIMER);
    sim.tick(1);
    assert_eq!(sim.resource::<WaveState>().phase, WavePhase::Arrived);
    assert_eq!(sim.resource::<WaveState>().index, 2);
    // the seed latched when its hit fired
    assert!(sim.world().get::<WaterState>(ocean).unwrap().wave_latched);

    // the staged front reaches the road a couple of ticks later
    sim.tick(3);
    let road_water = sim.world().get::<WaterState>(road).unwrap();
    assert!(road_water.wave_latched);
    assert!(road_water.fill >= TSUNAMI_FILL_INJECTION);
    assert!(road_water.fill_rate > base_rate);

    hurry(&mut sim, WAVE_RECEDE_TIMER);
    sim.tick(1);
    assert_eq!(sim.resource::<WaveState>().phase, WavePhase::Calm);
    assert!(!sim.world().get::<WaterState>(ocean).unwrap().wave_latched);
    assert!(!sim.world().get::<WaterState>(road).unwrap().wave_latched);
    // the countdown restarted on its own
    assert!(sim
        .resource::<TimerRegistry>()
        .is_running(WAVE_WARNING_TIMER));
}

#[test]
fn test_wave_danger_never_decreases_over_cycles() {
    let mut sim = TestSettlement::new();
    let mut last_danger = 0.0;
    for _ in 0..3 {
        hurry(&mut sim, WAVE_ARRIVAL_TIMER);
        sim.tick(1);
        let wave = sim.resource::<WaveState>();
        assert!(wave.danger() > last_danger);
        last_danger = wave.danger();
        hurry(&mut sim, WAVE_RECEDE_TIMER);
        sim.tick(1);
    }
}

#[test]
fn test_second_wave_can_hit_same_cell_again() {
    let mut sim = TestSettlement::new();
    let ocean = sim.place("ocean", 5, 5).unwrap();
    let road = sim.place("road", 6, 5).unwrap();
    {
        let mut water = sim.world().get_mut::<WaterState>(ocean).unwrap();
        water.fill = 1.0;
        water.flooded = true;
    }

    hurry(&mut sim, WAVE_ARRIVAL_TIMER);
    sim.tick(4);
    let first_fill = sim.world().get::<WaterState>(road).unwrap().fill;
    assert!(first_fill > 0.0);

    hurry(&mut sim, WAVE_RECEDE_TIMER);
    sim.tick(1);
    hurry(&mut sim, WAVE_ARRIVAL_TIMER);
    sim.tick(4);
    let second_fill = sim.world().get::<WaterState>(road).unwrap().fill;
    assert!(second_fill > first_fill);
}
