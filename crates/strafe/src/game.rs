//! # Game: The Frame Driver
//!
//! [`Game`] owns the [`World`], the simulation [`Schedule`], and a two-state
//! machine:
//!
//! ```text
//!            Quit event / Escape / Q
//!  Running ───────────────────────────▶ Quit
//! ```
//!
//! While running, one tick is:
//!
//! ```text
//!  Time ─▶ pipeline() ─▶ render_sprites ─▶ present ─▶ clear input edges
//! ```
//!
//! The driver knows nothing about windows. The winit adapter translates OS
//! events into [`FrameEvent`]s and calls [`Game::frame`] on every redraw;
//! tests call [`Game::step`] with a fixed delta and a
//! [`RecordingCanvas`](crate::render::RecordingCanvas).

use std::time::Duration;

use crate::animation::AnimationTable;
use crate::assets::{AssetError, SpriteSheet, TextureCache, TextureFactory};
use crate::components::PlayArea;
use crate::config::GameConfig;
use crate::ecs::{Schedule, World};
use crate::input::{Input, KeyCode};
use crate::render::{Canvas, ClearColor, RenderError, render_sprites};
use crate::spawn::{Level, spawn_level};
use crate::systems::pipeline;
use crate::time::Time;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    Running,
    Quit,
}

/// Input the driver reacts to, already stripped of windowing details.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameEvent {
    Quit,
    KeyDown(KeyCode),
    KeyUp(KeyCode),
}

pub struct Game {
    world: World,
    schedule: Schedule,
    state: GameState,
    level: Level,
}

impl Game {
    /// Build a game around textures and clips that are already loaded.
    pub fn new(
        config: &GameConfig,
        sheet: SpriteSheet,
        animations: &AnimationTable,
    ) -> Result<Self, AssetError> {
        let mut world = World::new();
        world.insert_resource(Time::new());
        world.insert_resource(Input::<KeyCode>::new());
        world.insert_resource(PlayArea(config.play_area()));
        world.insert_resource(config.bullets);
        world.insert_resource(ClearColor(config.clear_color));
        world.insert_resource(sheet);

        let level = spawn_level(&mut world, config, animations)?;
        let schedule = pipeline();
        log::debug!(
            "Schedule: {}",
            schedule.system_names().collect::<Vec<_>>().join(" → ")
        );

        Ok(Self {
            world,
            schedule,
            state: GameState::Running,
            level,
        })
    }

    /// Load every texture and animation clip from `config.asset_dir`, then
    /// build the game. The texture cache stays in the world as a resource.
    pub fn load(config: &GameConfig, factory: &mut dyn TextureFactory) -> Result<Self, AssetError> {
        let dir = config.asset_dir.as_path();
        let mut cache = TextureCache::new();
        let sheet = SpriteSheet::load(dir, &mut cache, factory)?;

        let mut animations = AnimationTable::new();
        let mut names = vec![config.player.animation.as_str(), config.enemies.animation.as_str()];
        names.dedup();
        for name in names {
            animations.extend(AnimationTable::load(dir.join(format!("{name}.json")))?);
        }
        log::info!(
            "Loaded {} textures and {} animation clips from '{}'",
            cache.len(),
            animations.len(),
            dir.display()
        );

        let mut game = Self::new(config, sheet, &animations)?;
        game.world.insert_resource(cache);
        Ok(game)
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == GameState::Running
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Entities spawned at startup.
    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn handle_event(&mut self, event: FrameEvent) {
        match event {
            FrameEvent::Quit => self.quit("quit requested"),
            FrameEvent::KeyDown(KeyCode::Escape | KeyCode::KeyQ) => self.quit("quit key"),
            FrameEvent::KeyDown(key) => self.world.resource_mut::<Input<KeyCode>>().press(key),
            FrameEvent::KeyUp(key) => self.world.resource_mut::<Input<KeyCode>>().release(key),
        }
    }

    fn quit(&mut self, reason: &str) {
        if self.state == GameState::Running {
            log::info!("Quitting: {reason}");
            self.state = GameState::Quit;
        }
    }

    /// Run one tick, measuring the delta from the monotonic clock.
    pub fn frame(&mut self, canvas: &mut dyn Canvas) -> Result<(), RenderError> {
        if !self.is_running() {
            return Ok(());
        }
        self.world.resource_mut::<Time>().update();
        self.tick(canvas)
    }

    /// Run one tick of exactly `dt`.
    pub fn step(&mut self, dt: Duration, canvas: &mut dyn Canvas) -> Result<(), RenderError> {
        if !self.is_running() {
            return Ok(());
        }
        self.world.resource_mut::<Time>().advance(dt);
        self.tick(canvas)
    }

    fn tick(&mut self, canvas: &mut dyn Canvas) -> Result<(), RenderError> {
        self.schedule.run(&mut self.world);
        render_sprites(&mut self.world, canvas);
        let presented = canvas.present();
        self.world.resource_mut::<Input<KeyCode>>().clear_just();

        let time = self.world.resource::<Time>();
        if time.frame_count() % 600 == 0 {
            log::debug!(
                "Frame {}: {} entities, {:.0} fps",
                time.frame_count(),
                self.world.entity_count(),
                time.fps()
            );
        }
        presented
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::components::{Damage, Energy, Position};
    use crate::render::{DrawCall, RecordingCanvas};
    use crate::spawn::tests::{test_animations, test_sheet};

    const DT: Duration = Duration::from_micros(62_500);

    fn test_game(config: &GameConfig) -> Game {
        Game::new(config, test_sheet(), &test_animations()).unwrap()
    }

    fn quiet_boss() -> GameConfig {
        let mut config = GameConfig::default();
        config.boss.fire_interval = 1000.0;
        config
    }

    fn player_x(game: &Game) -> f32 {
        game.world()
            .get::<Position>(game.level().player)
            .map(|p| p.0.x)
            .unwrap_or(f32::NAN)
    }

    #[test]
    fn player_shot_damages_boss() {
        let mut game = test_game(&quiet_boss());
        let mut canvas = RecordingCanvas::new();
        let boss = game.level().boss;

        // Fly right until the player sits under the boss.
        game.handle_event(FrameEvent::KeyDown(KeyCode::ArrowRight));
        for _ in 0..100 {
            if player_x(&game) >= 310.0 {
                break;
            }
            game.step(DT, &mut canvas).unwrap();
        }
        game.handle_event(FrameEvent::KeyUp(KeyCode::ArrowRight));
        assert!((310.0..330.0).contains(&player_x(&game)));

        game.handle_event(FrameEvent::KeyDown(KeyCode::KeyZ));
        game.step(DT, &mut canvas).unwrap();
        game.handle_event(FrameEvent::KeyUp(KeyCode::KeyZ));
        assert_eq!(game.world().entities_with::<Damage>().len(), 1);

        for _ in 0..60 {
            if game.world().entities_with::<Damage>().is_empty() {
                break;
            }
            game.step(DT, &mut canvas).unwrap();
        }
        assert!(game.world().entities_with::<Damage>().is_empty());
        assert_eq!(game.world().get::<Energy>(boss), Some(&Energy(290)));
        assert!(game.world().is_alive(game.level().player));
    }

    #[test]
    fn every_tick_renders_one_frame() {
        let mut game = test_game(&quiet_boss());
        let mut canvas = RecordingCanvas::new();
        game.step(DT, &mut canvas).unwrap();
        game.step(DT, &mut canvas).unwrap();

        assert_eq!(canvas.frames_presented(), 2);
        let frame = canvas.last_frame();
        // clear, background, player, 4 UFOs, boss, present
        assert_eq!(frame.len(), 9);
        assert!(matches!(frame[0], DrawCall::Clear(_)));
        assert_eq!(frame.last(), Some(&DrawCall::Present));
    }

    #[test]
    fn escape_and_q_quit() {
        for key in [KeyCode::Escape, KeyCode::KeyQ] {
            let mut game = test_game(&GameConfig::default());
            game.handle_event(FrameEvent::KeyDown(KeyCode::ArrowLeft));
            assert!(game.is_running());
            game.handle_event(FrameEvent::KeyDown(key));
            assert_eq!(game.state(), GameState::Quit);
        }
    }

    #[test]
    fn quit_stops_ticking() {
        let mut game = test_game(&GameConfig::default());
        let mut canvas = RecordingCanvas::new();
        game.handle_event(FrameEvent::Quit);
        game.step(DT, &mut canvas).unwrap();

        assert!(canvas.calls().is_empty());
        assert_eq!(game.world().resource::<Time>().frame_count(), 0);
    }

    #[test]
    fn input_edges_last_one_tick() {
        let mut game = test_game(&GameConfig::default());
        let mut canvas = RecordingCanvas::new();
        game.handle_event(FrameEvent::KeyDown(KeyCode::ArrowUp));
        assert!(game.world().resource::<Input<KeyCode>>().just_pressed(KeyCode::ArrowUp));

        game.step(DT, &mut canvas).unwrap();
        let input = game.world().resource::<Input<KeyCode>>();
        assert!(input.pressed(KeyCode::ArrowUp));
        assert!(!input.just_pressed(KeyCode::ArrowUp));
    }

    #[test]
    fn boss_bombs_player_in_lane() {
        let mut config = GameConfig::default();
        config.player.position = crate::math::Vec2::new(320.0, 400.0);
        config.boss.fire_interval = 0.0;
        let mut game = test_game(&config);
        let mut canvas = RecordingCanvas::new();

        game.step(DT, &mut canvas).unwrap();
        assert_eq!(game.world().entities_with::<Damage>().len(), 1);

        // 100 px/s from y=224 to the player's top edge at y=384 takes ~1.6 s,
        // after which one bomb lands per tick.
        for _ in 0..30 {
            game.step(DT, &mut canvas).unwrap();
        }
        let energy = game.world().get::<Energy>(game.level().player).map(|e| e.0);
        assert!(energy.is_some_and(|e| e < 100), "player energy {energy:?}");
    }

    fn write_assets(dir: &Path) {
        std::fs::create_dir_all(dir).unwrap();
        for (file, w, h) in [
            (SpriteSheet::BACKGROUND, 64, 48),
            (SpriteSheet::PLAYER, 64, 32),
            (SpriteSheet::UFO, 24, 24),
            (SpriteSheet::BOSS, 64, 48),
            (SpriteSheet::BULLET, 4, 8),
        ] {
            image::RgbaImage::from_pixel(w, h, image::Rgba([0, 128, 255, 255]))
                .save(dir.join(file))
                .unwrap();
        }
        std::fs::write(
            dir.join("player.json"),
            r#"{ "frames": [
                { "frame": { "x": 0, "y": 0, "w": 32, "h": 32 } },
                { "frame": { "x": 32, "y": 0, "w": 32, "h": 32 } } ] }"#,
        )
        .unwrap();
        std::fs::write(
            dir.join("ufo.json"),
            r#"{"frames": [{"frame": {"x": 0, "y": 0, "w": 24, "h": 24}, "duration": 200}]}"#,
        )
        .unwrap();
    }

    #[test]
    fn load_reads_textures_and_clips_from_asset_dir() {
        let dir = std::env::temp_dir().join(format!("strafe-game-{}", std::process::id()));
        write_assets(&dir);
        let config = GameConfig {
            asset_dir: dir.clone(),
            ..GameConfig::default()
        };

        let mut canvas = RecordingCanvas::new();
        let game = Game::load(&config, &mut canvas).unwrap();

        assert_eq!(canvas.textures().len(), 5);
        assert_eq!(game.world().resource::<TextureCache>().len(), 5);
        assert_eq!(game.world().entity_count(), 6);
    }

    #[test]
    fn load_without_clip_file_fails() {
        let dir = std::env::temp_dir().join(format!("strafe-game-noclip-{}", std::process::id()));
        write_assets(&dir);
        std::fs::remove_file(dir.join("ufo.json")).unwrap();
        let config = GameConfig {
            asset_dir: dir,
            ..GameConfig::default()
        };

        let err = Game::load(&config, &mut RecordingCanvas::new()).err();
        assert!(matches!(err, Some(AssetError::Io { .. })));
    }
}
