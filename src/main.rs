use std::time::{Duration, Instant};

use async_std::task;
use iced::futures::channel::mpsc;
use iced::futures::{SinkExt, Stream};
use iced::keyboard::key::Named;
use iced::keyboard::{self, Key};
use iced::stream::channel;
use iced::widget::image::{FilterMethod, Handle};
use iced::widget::{
    button, checkbox, column, combo_box, container, row, slider, text, text_input,
};
use iced::window::{Position, Settings as WindowSettings};
use iced::{Alignment, Color, Element, Length, Size, Subscription, Task, application};

use crate::camera::{Camera, CameraInput};
use crate::config::AppConfig;
use crate::render::scenes::load_scenes;
use crate::render::{Renderer, Settings};

mod camera;
mod config;
mod export;
mod render;

fn main() -> iced::Result {
    env_logger::init();

    let application = application("prism", update, view);
    let window = WindowSettings {
        size: Size::new(1280.0, 800.0),
        position: Position::Centered,
        ..Default::default()
    };
    application.subscription(subscription).window(window).run()
}

struct State {
    config: AppConfig,
    worker: Option<mpsc::Sender<WorkerInput>>,

    scene_ids: combo_box::State<String>,
    selected_scene: String,

    resolution_y_text: String,
    config_error: Option<String>,

    input: CameraInput,

    viewport: Option<FrameUpdate>,
    status: Option<String>,
}

impl Default for State {
    fn default() -> Self {
        let config = AppConfig::load();
        let scene_ids = load_scenes()
            .iter()
            .map(|scene| scene.id.to_owned())
            .collect();

        Self {
            resolution_y_text: config.resolution_y.to_string(),
            selected_scene: config.scene.clone(),
            config,
            worker: None,
            scene_ids: combo_box::State::new(scene_ids),
            config_error: None,
            input: CameraInput::default(),
            viewport: None,
            status: None,
        }
    }
}

#[derive(Debug, Clone)]
enum Message {
    Worker(WorkerMessage),
    KeyPressed(Key),
    KeyReleased(Key),
    SelectScene(String),
    ToggleAccumulate(bool),
    ToggleSlowRandom(bool),
    SetSamplesPerPixel(u32),
    UpdateResolutionY(String),
    ResetAccumulation,
    SaveImage,
    Exit,
}

/// One rendered frame, ready for presentation.
#[derive(Debug, Clone)]
struct FrameUpdate {
    handle: Handle,
    width: u32,
    height: u32,
    frame_index: u32,
    render_millis: f32,
}

#[derive(Debug, Clone)]
enum WorkerMessage {
    LinkSender(mpsc::Sender<WorkerInput>),
    Frame(FrameUpdate),
    Saved(Result<String, String>),
}

enum WorkerInput {
    Camera(CameraInput),
    Settings(Settings),
    ResolutionY(u32),
    SelectScene(String),
    Reset,
    Save,
}

fn update(state: &mut State, message: Message) -> Task<Message> {
    match message {
        Message::Worker(WorkerMessage::LinkSender(mut sender)) => {
            // replay the persisted state into the fresh worker
            let _ = sender.try_send(WorkerInput::Settings(state.config.settings));
            let _ = sender.try_send(WorkerInput::ResolutionY(state.config.resolution_y));
            let _ = sender.try_send(WorkerInput::SelectScene(state.selected_scene.clone()));
            state.worker = Some(sender);
        }
        Message::Worker(WorkerMessage::Frame(frame)) => state.viewport = Some(frame),
        Message::Worker(WorkerMessage::Saved(result)) => {
            state.status = Some(match result {
                Ok(path) => format!("Saved {path}"),
                Err(err) => format!("Save failed: {err}"),
            });
        }
        Message::KeyPressed(key) => {
            if apply_key(&mut state.input, &key, true) {
                send(state, WorkerInput::Camera(state.input));
            }
        }
        Message::KeyReleased(key) => {
            if apply_key(&mut state.input, &key, false) {
                send(state, WorkerInput::Camera(state.input));
            }
        }
        Message::SelectScene(id) => {
            state.selected_scene = id.clone();
            state.config.scene = id.clone();
            send(state, WorkerInput::SelectScene(id));
        }
        Message::ToggleAccumulate(value) => {
            state.config.settings.accumulate = value;
            send(state, WorkerInput::Settings(state.config.settings));
        }
        Message::ToggleSlowRandom(value) => {
            state.config.settings.slow_random = value;
            send(state, WorkerInput::Settings(state.config.settings));
        }
        Message::SetSamplesPerPixel(value) => {
            state.config.settings.samples_per_pixel = value;
            send(state, WorkerInput::Settings(state.config.settings));
        }
        Message::UpdateResolutionY(value) => {
            state.resolution_y_text = value;
            match state.resolution_y_text.parse::<u32>() {
                Ok(resolution) if (1..=2000).contains(&resolution) => {
                    state.config_error = None;
                    state.config.resolution_y = resolution;
                    send(state, WorkerInput::ResolutionY(resolution));
                }
                _ => {
                    state.config_error =
                        Some("Resolution Y must be a number between 1 and 2000".to_owned());
                }
            }
        }
        Message::ResetAccumulation => send(state, WorkerInput::Reset),
        Message::SaveImage => send(state, WorkerInput::Save),
        Message::Exit => {
            if let Err(err) = state.config.save() {
                log::error!("Failed to save config: {err}");
            }
            return iced::exit();
        }
    }

    Task::none()
}

fn send(state: &mut State, input: WorkerInput) {
    if let Some(worker) = &mut state.worker {
        let _ = worker.try_send(input);
    }
}

fn apply_key(input: &mut CameraInput, key: &Key, pressed: bool) -> bool {
    let previous = *input;

    match key {
        Key::Character(character) => match character.as_str() {
            "w" => input.forward = pressed,
            "s" => input.backward = pressed,
            "a" => input.left = pressed,
            "d" => input.right = pressed,
            "e" => input.up = pressed,
            "q" => input.down = pressed,
            _ => {}
        },
        Key::Named(named) => match named {
            Named::ArrowUp => input.pitch_up = pressed,
            Named::ArrowDown => input.pitch_down = pressed,
            Named::ArrowLeft => input.yaw_left = pressed,
            Named::ArrowRight => input.yaw_right = pressed,
            _ => {}
        },
        _ => {}
    }

    *input != previous
}

fn view(state: &State) -> Element<'_, Message> {
    let viewport: Element<'_, Message> = match &state.viewport {
        Some(frame) => iced::widget::image(frame.handle.clone())
            .filter_method(FilterMethod::Nearest)
            .width(Length::Fill)
            .height(Length::Fill)
            .into(),
        None => container(text("Waiting for the first frame..."))
            .center(Length::Fill)
            .into(),
    };

    let settings = &state.config.settings;
    let stats = match &state.viewport {
        Some(frame) => format!(
            "{}x{}, frame {}, {:.1} ms",
            frame.width, frame.height, frame.frame_index, frame.render_millis
        ),
        None => String::new(),
    };

    let panel = column![
        text("Settings").size(18),
        checkbox("Accumulate", settings.accumulate).on_toggle(Message::ToggleAccumulate),
        checkbox("Slow random", settings.slow_random).on_toggle(Message::ToggleSlowRandom),
        column![
            text(format!("Anti-aliasing: {} spp", settings.samples_per_pixel)),
            slider(1..=16u32, settings.samples_per_pixel, Message::SetSamplesPerPixel),
        ]
        .spacing(2),
        column![
            text("Resolution Y"),
            text_input("Resolution Y", &state.resolution_y_text)
                .on_input(Message::UpdateResolutionY),
        ]
        .spacing(2),
        column![
            text("Scene"),
            combo_box(
                &state.scene_ids,
                "Select scene",
                Some(&state.selected_scene),
                Message::SelectScene
            ),
        ]
        .spacing(2),
        if let Some(err) = &state.config_error {
            text(err.clone()).color(Color::from_rgb(1.0, 0.3, 0.3))
        } else {
            text(stats)
        },
        row![
            button("Reset").on_press(Message::ResetAccumulation),
            button("Save image").on_press(Message::SaveImage),
        ]
        .spacing(10),
        button("Exit")
            .style(button::secondary)
            .on_press(Message::Exit),
        text(state.status.clone().unwrap_or_default()).size(12),
        text("Move: WASD + Q/E, look around: arrow keys").size(12),
    ]
    .spacing(10)
    .width(260);

    container(
        row![
            container(viewport).width(Length::Fill).height(Length::Fill),
            container(panel).padding(10),
        ]
        .spacing(10)
        .align_y(Alignment::Start),
    )
    .padding(6)
    .width(Length::Fill)
    .height(Length::Fill)
    .into()
}

fn subscription(_state: &State) -> Subscription<Message> {
    Subscription::batch([
        Subscription::run(render_worker).map(Message::Worker),
        keyboard::on_key_press(|key, _modifiers| Some(Message::KeyPressed(key))),
        keyboard::on_key_release(|key, _modifiers| Some(Message::KeyReleased(key))),
    ])
}

/// Background loop that owns the renderer, camera and scene library. The UI
/// only ever exchanges messages with it.
fn render_worker() -> impl Stream<Item = WorkerMessage> {
    channel(100, |mut output| async move {
        let (sender, mut receiver) = mpsc::channel(100);
        let _ = output.send(WorkerMessage::LinkSender(sender)).await;

        task::spawn(async move {
            let scenes = load_scenes();
            let mut scene_index = 0;
            let mut camera = Camera::new(45.0, 0.1, 100.0);
            let mut renderer = Renderer::new(Settings::default());
            let mut input = CameraInput::default();
            let mut resolution_y: u32 = 300;
            let mut save_requested = false;
            let mut last_tick = Instant::now();

            camera.look_at(scenes[0].camera_position, scenes[0].camera_forward);
            log::info!("Render worker up, {} scenes", scenes.len());

            loop {
                let mut reset = false;

                while let Ok(Some(message)) = receiver.try_next() {
                    match message {
                        WorkerInput::Camera(snapshot) => input = snapshot,
                        WorkerInput::Settings(settings) => renderer.settings = settings,
                        WorkerInput::ResolutionY(resolution) => resolution_y = resolution,
                        WorkerInput::SelectScene(id) => {
                            if let Some(index) = scenes.iter().position(|scene| scene.id == id) {
                                scene_index = index;
                                let scene = &scenes[scene_index];
                                camera.look_at(scene.camera_position, scene.camera_forward);
                                reset = true;
                                log::info!("Switched to scene '{id}'");
                            } else {
                                log::warn!("Unknown scene '{id}'");
                            }
                        }
                        WorkerInput::Reset => reset = true,
                        WorkerInput::Save => save_requested = true,
                    }
                }

                let width = resolution_y * 3 / 2;
                let height = resolution_y;
                camera.on_resize(width, height);
                if renderer.on_resize(width, height) {
                    reset = true;
                }

                let ts = last_tick.elapsed().as_secs_f32();
                last_tick = Instant::now();
                if camera.on_update(ts, &input) {
                    reset = true;
                }
                if reset {
                    renderer.reset_frame_index();
                }

                let frame_index = renderer.frame_index();
                let started = Instant::now();
                renderer.render(&scenes[scene_index].scene, &camera);
                let render_millis = started.elapsed().as_secs_f32() * 1000.0;
                log::debug!("Frame {frame_index} took {render_millis:.2} ms");

                if save_requested {
                    save_requested = false;
                    let result =
                        export::write_ppm(renderer.final_image(), renderer.width(), renderer.height())
                        .map(|path| path.display().to_string())
                        .map_err(|err| err.to_string());
                    match &result {
                        Ok(path) => log::info!("Wrote {path}"),
                        Err(err) => log::error!("Image export failed: {err}"),
                    }
                    let _ = output.send(WorkerMessage::Saved(result)).await;
                }

                let frame = FrameUpdate {
                    handle: frame_handle(renderer.final_image(), width, height),
                    width,
                    height,
                    frame_index,
                    render_millis,
                };
                if output.send(WorkerMessage::Frame(frame)).await.is_err() {
                    break;
                }

                task::sleep(Duration::from_millis(1)).await;
            }
        })
        .await;
    })
}

/// Presenter step: the renderer's row 0 is the bottom of the image, the image
/// widget expects the top row first.
fn frame_handle(pixels: &[u32], width: u32, height: u32) -> Handle {
    let mut bytes = Vec::with_capacity(pixels.len() * 4);
    for row in pixels.chunks_exact(width as usize).rev() {
        for pixel in row {
            bytes.extend_from_slice(&pixel.to_le_bytes());
        }
    }
    Handle::from_rgba(width, height, bytes)
}
