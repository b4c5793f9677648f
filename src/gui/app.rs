use crate::config::{self, RingConfig};
use crate::events::AppEvent;
use crate::gui::ring::{Command, Signal};
use crate::gui::theme;
use crate::gui::widget::{HoldMsg, HoldRing};
use gtk::prelude::*;
use gtk4 as gtk;
use relm4::prelude::*;
use std::path::PathBuf;

pub struct AppModel {
    pub ring: Controller<HoldRing>,
    pub status: String,
    pub filled: bool,
    pub config_path: Option<PathBuf>,
}

pub struct AppInit {
    pub config: RingConfig,
    pub config_path: Option<PathBuf>,
    pub events: async_channel::Receiver<AppEvent>,
    pub size: (i32, i32),
}

#[derive(Debug)]
pub enum AppMsg {
    Press,
    Release,
    Stop,
    Finished(Signal),
    ConfigReload,
}

impl From<AppEvent> for AppMsg {
    fn from(event: AppEvent) -> Self {
        match event {
            AppEvent::ConfigReload => AppMsg::ConfigReload,
        }
    }
}

#[relm4::component(pub)]
impl SimpleComponent for AppModel {
    type Init = AppInit;
    type Input = AppMsg;
    type Output = ();

    view! {
        #[root]
        #[name = "window"]
        gtk::ApplicationWindow {
            set_title: Some("Hold Ring"),
            set_default_size: (width, height),

            add_controller = gtk::EventControllerKey {
                connect_key_pressed[sender] => move |_, key, _, _| {
                    if key == gtk::gdk::Key::Escape {
                        sender.input(AppMsg::Stop);
                        return glib::Propagation::Stop;
                    }
                    glib::Propagation::Proceed
                }
            },

            gtk::Box {
                set_orientation: gtk::Orientation::Vertical,

                #[local_ref]
                ring_widget -> gtk::Box {
                    add_controller = gtk::GestureClick {
                        set_button: gtk::gdk::BUTTON_PRIMARY,
                        connect_pressed[sender] => move |_, _, _, _| {
                            sender.input(AppMsg::Press);
                        },
                        connect_released[sender] => move |_, _, _, _| {
                            sender.input(AppMsg::Release);
                        }
                    }
                },

                gtk::Label {
                    add_css_class: "hold-ring-status",
                    #[watch]
                    set_label: &model.status,
                }
            }
        }
    }

    fn init(
        init: Self::Init,
        root: Self::Root,
        sender: ComponentSender<Self>,
    ) -> ComponentParts<Self> {
        let AppInit {
            config,
            config_path,
            events,
            size: (width, height),
        } = init;

        theme::load_css();

        let ring = HoldRing::builder()
            .launch(config)
            .forward(sender.input_sender(), AppMsg::Finished);

        let model = AppModel {
            ring,
            status: "Press and hold".to_string(),
            filled: false,
            config_path,
        };

        let ring_widget = model.ring.widget();
        let widgets = view_output!();

        let sender_clone = sender.clone();
        relm4::spawn(async move {
            while let Ok(event) = events.recv().await {
                sender_clone.input(AppMsg::from(event));
            }
        });

        ComponentParts { model, widgets }
    }

    fn update(&mut self, msg: Self::Input, _sender: ComponentSender<Self>) {
        match msg {
            AppMsg::Press => {
                self.status = "Filling".to_string();
                self.ring.emit(HoldMsg::Command(Command::Forward));
            }
            AppMsg::Release => {
                // a completed hold stays completed
                if !self.filled {
                    self.ring.emit(HoldMsg::Command(Command::Backward));
                }
            }
            AppMsg::Stop => {
                self.filled = false;
                self.ring.emit(HoldMsg::Command(Command::Stop));
            }
            AppMsg::Finished(signal) => {
                log::info!("Ring finished: {} ({})", signal, signal.code());
                self.filled = signal == Signal::Filled;
                self.status = format!("{} ({})", signal, signal.code());
            }
            AppMsg::ConfigReload => {
                let loaded = match &self.config_path {
                    Some(path) => config::load_config_from(path),
                    None => config::load_config(),
                };
                match loaded {
                    Ok(new_config) => {
                        self.ring.emit(HoldMsg::Configure(new_config));
                        log::info!("Configuration reloaded");
                    }
                    Err(e) => log::error!("Failed to reload config: {}", e),
                }
            }
        }
    }
}
