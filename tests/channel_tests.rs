//! Integration tests for Channel lifecycle, configuration and the fade overlay

mod common;
use common::*;

use dcc_led_effects::{
    Channel, Direction, Effect, FadeDirection, Motion, Polarity, Power, Settings,
};

const FORWARD: Motion = Motion::new(Direction::Forward, 40);
const REVERSE: Motion = Motion::new(Direction::Reverse, 40);

#[test]
fn construction_forces_rest_state() {
    let timer = MockTimeSource::new();
    let channel = Channel::new(MockLed::new(), &timer, ScriptedRng::low());

    assert_eq!(channel.led().history(), &[255]);
    assert_eq!(channel.output(), 255);
    assert_eq!(channel.brightness(), 0);
    assert_eq!(channel.state(), Power::Off);
    assert_eq!(channel.effect(), Effect::Normal);
    assert_eq!(channel.fade_level(), 0);
    assert_eq!(channel.fade_request(), None);
}

#[test]
fn zero_calibration_keeps_output_dark_when_on() {
    let timer = MockTimeSource::new();
    let mut channel = channel_with(&timer, ScriptedRng::low(), 0x00, 0x00);

    channel.set_effect(Effect::Normal);
    channel.set_state(Power::On);
    channel.heartbeat(FORWARD);

    assert_eq!(channel.calibration().bright(), 0);
    assert_eq!(channel.calibration().dim(), 0);
    assert_eq!(channel.output(), 255);
}

#[test]
fn zero_brightness_with_fade_rate_stays_dark() {
    let timer = MockTimeSource::new();
    let mut channel = channel_with(&timer, ScriptedRng::low(), 0x00, 0x0f);

    channel.set_state(Power::On);
    for _ in 0..10 {
        channel.heartbeat(FORWARD);
        timer.advance(5);
    }

    assert_eq!(channel.output(), 255);
    assert_eq!(channel.fade_level(), 0);
    assert_eq!(channel.fade_request(), None);
}

#[test]
fn normal_without_fade_rate_snaps_on_and_off() {
    let timer = MockTimeSource::new();
    let mut channel = channel_with(&timer, ScriptedRng::low(), 0x0f, 0x00);

    channel.set_state(Power::On);
    channel.heartbeat(FORWARD);
    assert_eq!(channel.output(), 0);
    assert_eq!(channel.fade_level(), 255);

    timer.advance(1);
    channel.set_state(Power::Off);
    channel.heartbeat(FORWARD);
    assert_eq!(channel.output(), 255);
    assert_eq!(channel.fade_level(), 0);
}

#[test]
fn normal_fade_ramps_in_steps_of_two() {
    let timer = MockTimeSource::new();
    // bright 255, fade rate 17 -> 100 * 17 / 127 = 13 ms per step
    let mut channel = channel_with(&timer, ScriptedRng::low(), 0x0f, 0x01);
    assert_eq!(channel.calibration().fade_time_ms(), 13);

    channel.set_state(Power::On);
    channel.heartbeat(FORWARD);
    assert_eq!(channel.fade_request(), Some(FadeDirection::Rising));
    assert_eq!(channel.fade_level(), 2);
    assert_eq!(channel.output(), 253);

    timer.advance(12);
    channel.heartbeat(FORWARD);
    assert_eq!(channel.fade_level(), 2);

    timer.advance(1);
    channel.heartbeat(FORWARD);
    assert_eq!(channel.fade_level(), 4);
    assert_eq!(channel.output(), 251);
}

#[test]
fn normal_fade_saturates_at_bright_and_returns_to_zero() {
    let timer = MockTimeSource::new();
    let mut channel = channel_with(&timer, ScriptedRng::low(), 0x0f, 0x01);

    channel.set_state(Power::On);
    let mut previous = 0;
    for _ in 0..200 {
        channel.heartbeat(FORWARD);
        assert!(channel.fade_level() >= previous);
        previous = channel.fade_level();
        timer.advance(13);
    }
    assert_eq!(channel.fade_level(), 255);
    assert_eq!(channel.fade_request(), None);
    assert_eq!(channel.output(), 0);

    channel.set_state(Power::Off);
    for _ in 0..200 {
        channel.heartbeat(FORWARD);
        assert!(channel.fade_level() <= previous);
        previous = channel.fade_level();
        timer.advance(13);
    }
    assert_eq!(channel.fade_level(), 0);
    assert_eq!(channel.fade_request(), None);
    assert_eq!(channel.output(), 255);
}

#[test]
fn turning_on_mid_fall_reverses_the_ramp() {
    let timer = MockTimeSource::new();
    let mut channel = channel_with(&timer, ScriptedRng::low(), 0x0f, 0x00);

    channel.set_state(Power::On);
    channel.heartbeat(FORWARD);
    assert_eq!(channel.fade_level(), 255);

    // enable fading and start a fall
    channel.set_config2(0x01);
    channel.set_state(Power::Off);
    channel.heartbeat(FORWARD);
    assert_eq!(channel.fade_request(), Some(FadeDirection::Falling));
    assert_eq!(channel.fade_level(), 253);

    channel.set_state(Power::On);
    assert_eq!(channel.fade_request(), None);

    timer.advance(13);
    channel.heartbeat(FORWARD);
    assert_eq!(channel.fade_level(), 255);
    assert_eq!(channel.fade_request(), None);
    assert_eq!(channel.output(), 0);
}

#[test]
fn set_state_is_idempotent() {
    let timer = MockTimeSource::new();
    let mut channel = channel_with(&timer, ScriptedRng::low(), 0x0f, 0x01);

    channel.set_state(Power::On);
    channel.heartbeat(FORWARD);
    let request = channel.fade_request();
    let level = channel.fade_level();

    channel.set_state(Power::On);
    assert_eq!(channel.state(), Power::On);
    assert_eq!(channel.fade_request(), request);
    assert_eq!(channel.fade_level(), level);
}

#[test]
fn repeated_on_does_not_restart_a_strobe_flash() {
    let timer = MockTimeSource::new();
    let mut channel = channel_with(&timer, ScriptedRng::low(), 0x0f, 0x00);
    channel.set_effect(Effect::Strobe);

    channel.set_state(Power::On);
    channel.heartbeat(FORWARD);
    assert_eq!(channel.output(), 0);

    timer.advance(30);
    channel.set_state(Power::On);
    channel.heartbeat(FORWARD);
    assert_eq!(channel.output(), 0);

    timer.advance(20);
    channel.heartbeat(FORWARD);
    assert_eq!(channel.output(), 255);
}

#[test]
fn effect_switch_forces_off() {
    let timer = MockTimeSource::new();
    let mut channel = channel_with(&timer, ScriptedRng::low(), 0x0f, 0x00);

    channel.set_state(Power::On);
    channel.heartbeat(FORWARD);
    assert_eq!(channel.output(), 0);

    channel.set_effect(Effect::Beacon);
    assert_eq!(channel.state(), Power::Off);
    assert_eq!(channel.effect(), Effect::Beacon);
    assert_eq!(channel.fade_level(), 0);

    timer.advance(1);
    channel.heartbeat(FORWARD);
    assert_eq!(channel.output(), 255);
}

#[test]
fn effect_switch_discards_in_flight_fade() {
    let timer = MockTimeSource::new();
    let mut channel = channel_with(&timer, ScriptedRng::low(), 0x0f, 0x01);

    channel.set_state(Power::On);
    for _ in 0..10 {
        channel.heartbeat(FORWARD);
        timer.advance(13);
    }
    assert_eq!(channel.fade_request(), Some(FadeDirection::Rising));

    channel.set_effect(Effect::Normal);
    assert_eq!(channel.fade_request(), None);
    assert_eq!(channel.fade_level(), 0);

    channel.heartbeat(FORWARD);
    assert_eq!(channel.output(), 255);
    assert_eq!(channel.fade_request(), None);
}

#[test]
fn auto_dim_follows_direction() {
    let timer = MockTimeSource::new();
    // bright 255, dim 56
    let mut channel = channel_with(&timer, ScriptedRng::low(), 0x7f, 0x00);
    channel.set_effect(Effect::AutoDim);

    channel.set_state(Power::On);
    channel.heartbeat(FORWARD);
    assert_eq!(channel.output(), 0);

    timer.advance(8);
    channel.heartbeat(REVERSE);
    assert_eq!(brightness(channel.output()), 56);

    timer.advance(8);
    channel.set_state(Power::Off);
    channel.heartbeat(REVERSE);
    assert_eq!(channel.output(), 255);
}

#[test]
fn active_high_output_is_not_inverted() {
    let timer = MockTimeSource::new();
    let mut channel = Channel::with_polarity(
        MockLed::new(),
        &timer,
        ScriptedRng::low(),
        Polarity::ActiveHigh,
    );
    assert_eq!(channel.led().last_duty(), 0);

    channel.set_calibration(0x7f, 0x00);
    channel.set_effect(Effect::AutoDim);
    channel.set_state(Power::On);
    channel.heartbeat(REVERSE);

    assert_eq!(channel.output(), 56);
    assert_eq!(channel.brightness(), 56);
    assert_eq!(channel.polarity(), Polarity::ActiveHigh);
}

#[test]
fn unchanged_duty_is_not_rewritten() {
    let timer = MockTimeSource::new();
    let mut channel = channel_with(&timer, ScriptedRng::low(), 0x0f, 0x00);
    channel.set_effect(Effect::AutoDim);
    channel.set_state(Power::On);

    for _ in 0..5 {
        channel.heartbeat(FORWARD);
        timer.advance(10);
    }

    assert_eq!(channel.led().history(), &[255, 0]);
}

#[test]
fn lowering_brightness_clamps_fade_level() {
    let timer = MockTimeSource::new();
    let mut channel = channel_with(&timer, ScriptedRng::low(), 0x0f, 0x00);

    channel.set_state(Power::On);
    channel.heartbeat(FORWARD);
    assert_eq!(channel.fade_level(), 255);

    channel.set_config1(0x07);
    assert_eq!(channel.fade_level(), 56);

    channel.heartbeat(FORWARD);
    assert_eq!(brightness(channel.output()), 56);
}

#[test]
fn settings_image_configures_every_parameter() {
    let timer = MockTimeSource::new();
    let mut channel = Channel::new(MockLed::new(), &timer, ScriptedRng::low());

    channel.apply_settings(&Settings {
        config1: 0x5c,
        config2: 0x31,
        probability: 25,
        sample_time: 3,
        speed_threshold: 4,
        holdover_time: 12,
    });

    let cal = channel.calibration();
    assert_eq!(cal.bright(), 136);
    assert_eq!(cal.dim(), 24);
    assert_eq!(cal.fade_rate(), 17);
    assert_eq!(cal.flash_rate(), 51);
    assert_eq!(cal.probability(), 25);
    assert_eq!(cal.sample_time_ms(), 3000);
    assert_eq!(cal.speed_threshold(), 4);
    assert_eq!(cal.holdover_ms(), 12_000);
}

#[test]
fn fade_level_stays_within_bright_under_random_operations() {
    let timer = MockTimeSource::new();
    let mut channel = Channel::new(MockLed::new(), &timer, ScriptedRng::new(&[0, 50, 99, 10]));
    channel.set_probability(60);

    let mut seed: u32 = 0x1234_5678;
    let mut next = move || {
        seed ^= seed << 13;
        seed ^= seed >> 17;
        seed ^= seed << 5;
        seed
    };

    for _ in 0..5000 {
        let roll = next();
        match roll % 16 {
            0 => channel.set_state(Power::On),
            1 => channel.set_state(Power::Off),
            2 => channel.set_effect(if roll & 0x100 == 0 {
                Effect::Normal
            } else {
                Effect::Random
            }),
            3 => channel.set_calibration((roll >> 8) as u8, (roll >> 16) as u8),
            4 => channel.set_speed_threshold((roll >> 8) as u8 % 4),
            _ => {
                timer.advance(roll % 40);
                let direction = if roll & 0x200 == 0 {
                    Direction::Forward
                } else {
                    Direction::Reverse
                };
                channel.heartbeat(Motion::new(direction, (roll >> 12) as u8 % 8));
            }
        }

        assert!(channel.fade_level() <= channel.calibration().bright());
    }
}
