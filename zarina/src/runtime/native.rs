//! The desktop host: a tao event loop driving one wry web view, a muda menu
//! bar, the system clipboard and native message boxes.

use std::path::Path;
use std::sync::Arc;

use log::{debug, error, info, warn};
use muda::{Menu, MenuEvent};
use tao::dpi::LogicalSize;
use tao::event::{Event, StartCause, WindowEvent};
use tao::event_loop::{
    ControlFlow, EventLoopBuilder, EventLoopProxy, EventLoopWindowTarget,
};
use tao::window::{Fullscreen, Window, WindowBuilder};
use wry::{PageLoadEvent, WebView, WebViewBuilder};

use super::app::Shell;
use super::bootstrap::BootstrapOptions;
use super::events::{AppEvent, Lifecycle};
use super::host::{
    Clipboard, ContentWindow, Dialogs, HostServices, WindowFactory,
};
use crate::config::{APP_NAME, WINDOW_HEIGHT, WINDOW_WIDTH};
use crate::extension::ExtensionRegistry;
use crate::framework::logging::init_logger;
use crate::gpu::RuntimeConfig;
use crate::gpu::wgpu_probe::WgpuProbe;
use crate::presence::DiscordIpcConnector;
use crate::window::{MenuCommand, build_menu};

#[derive(Debug)]
enum UserEvent {
    PageLoaded(String),
    Menu(MenuCommand),
}

pub fn run() -> Result<(), String> {
    init_logger();
    info!("Starting {}", APP_NAME);

    let event_loop = EventLoopBuilder::<UserEvent>::with_user_event().build();
    let proxy = event_loop.create_proxy();

    let menu = build_menu()?;
    #[cfg(target_os = "macos")]
    menu.init_for_nsapp();

    let menu_proxy = proxy.clone();
    MenuEvent::set_event_handler(Some(move |event: MenuEvent| {
        match MenuCommand::from_id(&event.id.0) {
            Some(command) => {
                if menu_proxy.send_event(UserEvent::Menu(command)).is_err() {
                    debug!("Event loop closed; dropping {:?}", command);
                }
            }
            None => warn!("Unknown menu item: {}", event.id.0),
        }
    }));

    let options = BootstrapOptions::default();
    let session = Arc::new(ExtensionRegistry::new(
        options.staging_root.clone(),
        cfg!(target_os = "windows"),
    ));
    let host = HostServices {
        gpu: Arc::new(WgpuProbe),
        session: session.clone(),
        presence: Arc::new(DiscordIpcConnector),
        clipboard: Box::new(SystemClipboard),
        dialogs: Box::new(NativeDialogs),
    };
    let mut shell = Shell::new(host, options);

    event_loop.run(move |event, target, control_flow| {
        *control_flow = ControlFlow::Wait;

        let Some(app_event) = translate(event) else {
            return;
        };

        let mut factory = NativeWindowFactory {
            target,
            proxy: &proxy,
            menu: &menu,
            session: &session,
        };

        if shell.handle(app_event, &mut factory) == Lifecycle::Exit {
            info!("Shutting down");
            *control_flow = ControlFlow::Exit;
        }
    })
}

fn translate(event: Event<'_, UserEvent>) -> Option<AppEvent> {
    match event {
        Event::NewEvents(StartCause::Init) => Some(AppEvent::HostReady),
        Event::UserEvent(UserEvent::PageLoaded(address)) => {
            Some(AppEvent::PageLoaded(address))
        }
        Event::UserEvent(UserEvent::Menu(command)) => {
            Some(AppEvent::Menu(command))
        }
        Event::WindowEvent {
            event: WindowEvent::CloseRequested,
            ..
        } => Some(AppEvent::CloseRequested),
        Event::Reopen {
            has_visible_windows: false,
            ..
        } => Some(AppEvent::Reactivated),
        _ => None,
    }
}

struct SystemClipboard;

impl Clipboard for SystemClipboard {
    fn read_text(&mut self) -> Result<Option<String>, String> {
        let mut clipboard =
            arboard::Clipboard::new().map_err(|err| err.to_string())?;

        match clipboard.get_text() {
            Ok(text) => Ok(Some(text)),
            Err(arboard::Error::ContentNotAvailable) => Ok(None),
            Err(err) => Err(err.to_string()),
        }
    }
}

struct NativeDialogs;

impl Dialogs for NativeDialogs {
    fn show_notice(&self, title: &str, message: &str) {
        rfd::MessageDialog::new()
            .set_level(rfd::MessageLevel::Info)
            .set_title(title)
            .set_description(message)
            .set_buttons(rfd::MessageButtons::Ok)
            .show();
    }
}

struct NativeWindowFactory<'a> {
    target: &'a EventLoopWindowTarget<UserEvent>,
    proxy: &'a EventLoopProxy<UserEvent>,
    menu: &'a Menu,
    session: &'a Arc<ExtensionRegistry>,
}

impl WindowFactory for NativeWindowFactory<'_> {
    fn create_window(
        &mut self,
        config: &RuntimeConfig,
    ) -> Result<Box<dyn ContentWindow>, String> {
        let window = WindowBuilder::new()
            .with_title(APP_NAME)
            .with_inner_size(LogicalSize::new(WINDOW_WIDTH, WINDOW_HEIGHT))
            .build(self.target)
            .map_err(|err| format!("failed to create window: {}", err))?;

        attach_menu(self.menu, &window);

        let extensions = self.session.extensions_path();
        if extensions.is_none() {
            debug!("Building web view without extensions");
        }

        let web_view = match self.build_web_view(&window, config, extensions)
        {
            Ok(web_view) => web_view,
            Err(err) if extensions.is_some() => {
                warn!(
                    "Web view failed with extensions ({}); retrying without",
                    err
                );
                self.build_web_view(&window, config, None)?
            }
            Err(err) => return Err(err),
        };

        Ok(Box::new(NativeWindow { web_view, window }))
    }
}

impl NativeWindowFactory<'_> {
    fn build_web_view(
        &self,
        window: &Window,
        config: &RuntimeConfig,
        extensions: Option<&Path>,
    ) -> Result<WebView, String> {
        let page_proxy = self.proxy.clone();
        let builder = WebViewBuilder::new().with_on_page_load_handler(
            move |event, address| {
                if matches!(event, PageLoadEvent::Finished)
                    && page_proxy
                        .send_event(UserEvent::PageLoaded(address))
                        .is_err()
                {
                    debug!("Event loop closed; dropping page load");
                }
            },
        );
        let builder = apply_runtime_config(builder, config, extensions);

        #[cfg(not(target_os = "linux"))]
        let web_view = builder.build(window);

        #[cfg(target_os = "linux")]
        let web_view = {
            use tao::platform::unix::WindowExtUnix;
            use wry::WebViewBuilderExtUnix;

            let vbox = window
                .default_vbox()
                .ok_or_else(|| "window has no GTK container".to_string())?;
            builder.build_gtk(vbox)
        };

        web_view.map_err(|err| format!("failed to create web view: {}", err))
    }
}

#[cfg(target_os = "windows")]
fn apply_runtime_config<'a>(
    builder: WebViewBuilder<'a>,
    config: &RuntimeConfig,
    extensions: Option<&Path>,
) -> WebViewBuilder<'a> {
    use wry::WebViewBuilderExtWindows;

    let builder = if config.flags().is_empty() {
        builder
    } else {
        builder.with_additional_browser_args(config.browser_args())
    };

    match extensions {
        Some(path) => builder
            .with_browser_extensions_enabled(true)
            .with_extensions_path(path),
        None => builder,
    }
}

#[cfg(not(target_os = "windows"))]
fn apply_runtime_config<'a>(
    builder: WebViewBuilder<'a>,
    config: &RuntimeConfig,
    _extensions: Option<&Path>,
) -> WebViewBuilder<'a> {
    info!(
        "Web view does not take engine switches on this platform; {} flags \
         for {:?} tier not applied",
        config.flags().len(),
        config.tier()
    );
    builder
}

fn attach_menu(menu: &Menu, window: &Window) {
    #[cfg(target_os = "windows")]
    {
        use tao::platform::windows::WindowExtWindows;

        // SAFETY: the handle belongs to a live window owned by this thread.
        if let Err(err) = unsafe { menu.init_for_hwnd(window.hwnd() as _) } {
            error!("Failed to attach menu: {}", err);
        }
    }

    #[cfg(target_os = "linux")]
    {
        use tao::platform::unix::WindowExtUnix;

        if let Err(err) =
            menu.init_for_gtk_window(window.gtk_window(), window.default_vbox())
        {
            error!("Failed to attach menu: {}", err);
        }
    }

    #[cfg(target_os = "macos")]
    {
        let _ = (menu, window);
    }
}

struct NativeWindow {
    // Declared first so the web view is torn down before its window.
    web_view: WebView,
    window: Window,
}

impl ContentWindow for NativeWindow {
    fn load_url(&mut self, url: &str) -> Result<(), String> {
        self.web_view.load_url(url).map_err(|err| err.to_string())
    }

    fn set_title(&mut self, title: &str) {
        self.window.set_title(title);
    }

    fn is_fullscreen(&self) -> bool {
        self.window.fullscreen().is_some()
    }

    fn set_fullscreen(&mut self, fullscreen: bool) {
        self.window
            .set_fullscreen(fullscreen.then_some(Fullscreen::Borderless(None)));
    }
}
