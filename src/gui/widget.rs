//! The ring as a relm4 component.
//!
//! Send it [`HoldMsg::Command`] to animate; every terminal transition is reported on
//! the component's output as a [`Signal`].

use crate::config::RingConfig;
use crate::gui::ring::{
    self, Animator, CanvasSize, Command, FrameToken, Host, MonotonicClock, Signal, Ticker,
};
use gtk::prelude::*;
use gtk4 as gtk;
use relm4::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;

pub struct HoldRing {
    pub animator: Rc<RefCell<Animator<MonotonicClock>>>,
    pub visible: bool,
    pub container: gtk::Box,
    pub drawing_area: gtk::DrawingArea,
}

#[derive(Debug)]
pub enum HoldMsg {
    Mount,
    Command(Command),
    Frame(FrameToken),
    Configure(RingConfig),
}

/// Drives the animator from GTK: frames come from the widget's tick callback,
/// redraws go through `queue_draw`.
struct GtkHost<'a> {
    container: &'a gtk::Box,
    drawing_area: &'a gtk::DrawingArea,
    sender: &'a ComponentSender<HoldRing>,
}

impl Ticker for GtkHost<'_> {
    fn request_frame(&mut self, token: FrameToken) {
        let sender = self.sender.clone();
        self.drawing_area.add_tick_callback(move |_, _| {
            sender.input(HoldMsg::Frame(token));
            glib::ControlFlow::Break
        });
    }
}

impl Host for GtkHost<'_> {
    fn container_size(&self) -> CanvasSize {
        CanvasSize::new(self.container.width() as f64, self.container.height() as f64)
    }

    fn resize_surface(&mut self, size: CanvasSize) {
        self.drawing_area.set_content_width(size.width as i32);
        self.drawing_area.set_content_height(size.height as i32);
    }

    fn refresh(&mut self) {
        self.drawing_area.queue_draw();
    }

    fn emit(&mut self, signal: Signal) {
        if self.sender.output(signal).is_err() {
            log::debug!("No receiver for ring signal {}", signal);
        }
    }
}

#[relm4::component(pub)]
impl SimpleComponent for HoldRing {
    type Init = RingConfig;
    type Input = HoldMsg;
    type Output = Signal;

    view! {
        #[root]
        #[name = "container"]
        gtk::Box {
            set_hexpand: true,
            set_vexpand: true,
            set_halign: gtk::Align::Fill,
            set_valign: gtk::Align::Fill,
            add_css_class: "hold-ring",

            connect_map[sender] => move |_| {
                sender.input(HoldMsg::Mount);
            },

            #[name = "drawing_area"]
            gtk::DrawingArea {
                set_hexpand: true,
                set_halign: gtk::Align::Center,
                set_valign: gtk::Align::Center,
                add_css_class: "hold-ring-surface",
                #[watch]
                set_opacity: if model.visible { 1.0 } else { 0.0 },
            }
        }
    }

    fn init(
        config: Self::Init,
        root: Self::Root,
        sender: ComponentSender<Self>,
    ) -> ComponentParts<Self> {
        let animator = Rc::new(RefCell::new(Animator::new(
            config,
            MonotonicClock::default(),
        )));

        let model = HoldRing {
            animator: animator.clone(),
            visible: false,
            container: root.clone(),
            drawing_area: gtk::DrawingArea::default(),
        };

        let widgets = view_output!();

        let mut model = model;
        model.drawing_area = widgets.drawing_area.clone();

        widgets.drawing_area.set_draw_func(move |_, cr, _, _| {
            if let Err(e) = ring::draw(cr, &animator.borrow().display_list()) {
                log::error!("Drawing error: {}", e);
            }
        });

        ComponentParts { model, widgets }
    }

    fn update(&mut self, msg: Self::Input, sender: ComponentSender<Self>) {
        let mut host = GtkHost {
            container: &self.container,
            drawing_area: &self.drawing_area,
            sender: &sender,
        };
        let mut animator = self.animator.borrow_mut();

        match msg {
            HoldMsg::Mount => animator.mount(&mut host),
            HoldMsg::Command(command) => animator.command(command, &mut host),
            HoldMsg::Frame(token) => animator.on_frame(token, &mut host),
            HoldMsg::Configure(config) => {
                if animator.set_config(config) {
                    host.refresh();
                }
            }
        }

        self.visible = animator.show_animation();
    }

    fn shutdown(&mut self, _widgets: &mut Self::Widgets, _output: relm4::Sender<Self::Output>) {
        self.animator.borrow_mut().teardown();
    }
}
