//! Headless demonstration of the Nebula Strike game core.
//!
//! Run with: cargo run --example headless_demo

use nebula_sim::{GameWorld, SoundKind};

fn main() {
    tracing_subscriber::fmt().with_target(false).init();

    println!("=== Nebula Strike - Headless Demo ===\n");

    let mut game = GameWorld::new();
    game.start_game();

    // Hold fire and weave gently for 30 seconds of game time
    let dt = 1.0 / 60.0;
    let mut explosions = 0usize;
    for frame in 0..(30 * 60) {
        let t = frame as f32 * dt;
        game.set_input((t * 0.8).sin(), (t * 0.3).cos() * 0.4, true);
        game.step(dt);

        for sound in game.drain_sounds() {
            if sound == SoundKind::Explosion {
                explosions += 1;
            }
        }

        if (frame + 1) % 300 == 0 {
            let snapshot = game.snapshot();
            println!(
                "t={:5.1}s  level={} score={} lives={} entities={} kills(sfx)={}",
                game.current_time(),
                snapshot.level,
                snapshot.score,
                snapshot.lives,
                snapshot.drawables.len(),
                explosions,
            );
        }
    }

    println!("\n=== Final Snapshot (JSON) ===\n");
    match game.snapshot().to_json_pretty() {
        Ok(json) => println!("{json}"),
        Err(err) => eprintln!("snapshot failed: {err}"),
    }
}
