//! Beaver Dam entry point
//!
//! The game itself runs in the browser through the wasm bindings. Natively
//! this runs a headless autoplay session against the core and logs how it
//! went, which is handy for balancing.

#[cfg(not(target_arch = "wasm32"))]
mod autoplay {
    use beaver_dam::consts::*;
    use beaver_dam::sim::{BuildMode, DestroyMode, Game, GamePhase};
    use beaver_dam::{ManualClock, Settings, SettingsError, Terrain};
    use glam::Vec3;

    const FRAME_DT: f32 = 1.0 / 60.0;
    const WALK_SPEED: f32 = 6.0;
    const CHEW_DPS: f32 = 60.0;

    /// Bot that walks to trees, eats logs, builds and knocks things down
    pub struct Bot {
        pub game: Game,
        clock: ManualClock,
        pos: Vec3,
        built: u32,
    }

    impl Bot {
        pub fn new(settings: Settings) -> Result<Self, SettingsError> {
            let clock = ManualClock::new(0.0);
            let terrain =
                beaver_dam::NoiseTerrain::with_radius(settings.seed, settings.world_radius);
            let mut game = Game::with_parts(settings, clock.clone(), terrain)?;
            game.start_game();
            let pos = Vec3::new(0.0, game.terrain().height(0.0, 0.0), 0.0);
            Ok(Self {
                game,
                clock,
                pos,
                built: 0,
            })
        }

        fn walk_toward(&mut self, target: Vec3) {
            let mut to = target - self.pos;
            to.y = 0.0;
            let step = WALK_SPEED * FRAME_DT;
            if to.length() > step {
                self.pos += to.normalize() * step;
            } else {
                self.pos += to;
            }
            self.pos.y = self.game.terrain().height(self.pos.x, self.pos.z);
        }

        pub fn step(&mut self) {
            self.clock.advance(FRAME_DT as f64 * 1000.0);
            self.game.frame(FRAME_DT, self.pos);

            if self.game.state().notification.is_some() {
                self.game.dismiss_notification();
            }
            for mob in self.game.state().mobs.clone() {
                if beaver_dam::ground_distance_sq(mob.pos, self.pos) < 4.0 {
                    self.game.take_damage(5.0);
                    self.game.remove_mob(mob.id);
                }
            }

            if self.try_build() || self.try_destroy() {
                return;
            }
            self.forage();
        }

        fn try_build(&mut self) -> bool {
            let state = self.game.state();
            let affordable = state
                .blueprints
                .iter()
                .filter(|bp| bp.unlocked && bp.cost <= state.wood_count)
                .map(|bp| bp.id)
                .next_back();
            let Some(id) = affordable else {
                return false;
            };
            if state.build == BuildMode::Idle {
                self.game.open_build_menu();
                self.game.select_blueprint(id);
            }
            self.game.update_placement_rotation(1.0, 0.0);
            self.game.place_structure(self.pos + Vec3::new(3.0, 0.0, 0.0));
            self.built += 1;
            true
        }

        fn try_destroy(&mut self) -> bool {
            // Knock down every other structure for the refund
            if self.built % 2 == 1 {
                return false;
            }
            let Some(target) = self.game.state().structures.first().map(|s| (s.id, s.pos)) else {
                return false;
            };
            if beaver_dam::ground_distance_sq(target.1, self.pos) > 9.0 {
                self.walk_toward(target.1);
                return true;
            }
            match self.game.state().destroy {
                DestroyMode::Idle => self.game.set_destroy_target(Some(target.0)),
                DestroyMode::Armed { .. } => self.game.start_destroying(),
                DestroyMode::Destroying { .. } => {}
            }
            true
        }

        fn forage(&mut self) {
            let now = self.game.now();
            let reach = self.game.collection_radius().powi(2);
            let nearest_log = self
                .game
                .state()
                .loose_logs
                .iter()
                .filter(|l| now - l.created_at >= LOG_INVULNERABLE_MS)
                .map(|l| (l.id, l.pos))
                .min_by(|a, b| {
                    beaver_dam::ground_distance_sq(a.1, self.pos)
                        .total_cmp(&beaver_dam::ground_distance_sq(b.1, self.pos))
                });
            if let Some((id, pos)) = nearest_log {
                if beaver_dam::ground_distance_sq(pos, self.pos) <= reach {
                    self.game.collect_loose_log(id);
                } else {
                    self.walk_toward(pos);
                }
                return;
            }

            let chomp = self.game.chomp_radius() + 1.0;
            let nearest_tree = self
                .game
                .state()
                .trees
                .iter()
                .filter(|t| !t.is_felled)
                .map(|t| (t.id, t.pos))
                .min_by(|a, b| {
                    beaver_dam::ground_distance_sq(a.1, self.pos)
                        .total_cmp(&beaver_dam::ground_distance_sq(b.1, self.pos))
                });
            if let Some((id, pos)) = nearest_tree {
                if beaver_dam::ground_distance_sq(pos, self.pos) <= chomp * chomp {
                    self.game.set_active_tree(Some(id));
                    self.game.damage_tree(id, CHEW_DPS * FRAME_DT);
                } else {
                    self.walk_toward(pos);
                }
            }
        }
    }

    pub fn run(settings: Settings, seconds: u32) -> Result<(), SettingsError> {
        let mut bot = Bot::new(settings)?;
        let frames = (seconds as f32 / FRAME_DT) as u32;
        for frame in 0..frames {
            bot.step();
            if bot.game.state().phase == GamePhase::GameOver {
                log::warn!("Bot died after {:.0}s", frame as f32 * FRAME_DT);
                break;
            }
            if frame % (60 * 30) == 0 {
                let state = bot.game.state();
                log::info!(
                    "t={:>4}s wood={} score={} logs={} combo=x{} mobs={} night={}",
                    (frame as f32 * FRAME_DT) as u32,
                    state.wood_count,
                    state.score,
                    state.total_logs_collected,
                    state.combo.multiplier,
                    state.mobs.len(),
                    state.is_night()
                );
            }
            bot.game.drain_events();
        }

        let state = bot.game.state();
        let unlocked = state.blueprints.iter().filter(|bp| bp.unlocked).count();
        println!(
            "Score {} | {} logs | {} structures standing | {}/{} blueprints | health {:.0}",
            state.score,
            state.total_logs_collected,
            state.structures.len(),
            unlocked,
            state.blueprints.len(),
            state.health
        );
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings = match std::env::var("BEAVER_DAM_SETTINGS") {
        Ok(json) => match beaver_dam::Settings::from_json(&json) {
            Ok(settings) => settings,
            Err(e) => {
                log::error!("{e}");
                std::process::exit(2);
            }
        },
        Err(_) => beaver_dam::Settings::default(),
    };
    log::info!("Beaver Dam (native autoplay) starting, seed {}", settings.seed);
    if let Err(e) = autoplay::run(settings, 600) {
        log::error!("{e}");
        std::process::exit(2);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is `wasm::start`, this is just to satisfy the compiler
}
