/// Somewhere a category click can send the user.
pub trait Navigator {
    fn navigate(&mut self, url: &str);
}

/// Opens URLs in the system's default browser.
#[derive(Debug, Default)]
pub struct BrowserNavigator;

impl Navigator for BrowserNavigator {
    fn navigate(&mut self, url: &str) {
        log::info!("Opening {url}");

        if let Err(e) = webbrowser::open(url) {
            log::error!("Failed to open {url} in a browser: {e}");
        }
    }
}

/// Remembers every URL instead of opening it.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    pub visited: Vec<String>,
}

#[cfg(test)]
impl Navigator for RecordingNavigator {
    fn navigate(&mut self, url: &str) {
        self.visited.push(url.to_string());
    }
}
