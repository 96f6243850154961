// Cross-platform template picker. On wasm we create an off-screen <input type=file> and read the
// chosen file with a FileReader; on native we use rfd::FileDialog. Either way the result lands in
// PENDING and the app takes it on its next frame.

use std::sync::Mutex;

use crate::template::SelectedFile;

const ACCEPTED_EXTENSIONS: &[&str] = &["svg", "png", "jpg", "jpeg"];

static PENDING: Mutex<Option<SelectedFile>> = Mutex::new(None);

/// A newer selection replaces one that has not been taken yet.
fn set_pending(file: SelectedFile) {
    log::debug!("file_picker: '{}' ready ({} bytes)", file.name, file.bytes.len());
    match PENDING.lock() {
        Ok(mut slot) => *slot = Some(file),
        Err(e) => log::error!("file_picker: pending slot poisoned: {e}"),
    }
}

pub fn take_selected_template() -> Option<SelectedFile> {
    PENDING.lock().ok().and_then(|mut slot| slot.take())
}

#[cfg(not(target_arch = "wasm32"))]
pub fn open_template_picker() {
    let Some(path) = rfd::FileDialog::new()
        .add_filter("Certificate template", ACCEPTED_EXTENSIONS)
        .pick_file()
    else {
        return;
    };
    match SelectedFile::read(&path) {
        Ok(file) => set_pending(file),
        Err(e) => log::error!("file_picker: failed to read {}: {e}", path.display()),
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::open_template_picker;

#[cfg(target_arch = "wasm32")]
mod web {
    use js_sys::Uint8Array;
    use wasm_bindgen::JsCast as _;
    use wasm_bindgen::JsValue;
    use wasm_bindgen::closure::Closure;
    use web_sys::{FileReader, HtmlInputElement};

    use super::{ACCEPTED_EXTENSIONS, set_pending};
    use crate::template::{SVG_MIME, SelectedFile};

    const INPUT_ID: &str = "certificate_template_input";

    pub fn open_template_picker() {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };

        // A cancelled dialog never fires onchange, so drop any leftover input first.
        if let Some(stale) = document.get_element_by_id(INPUT_ID) {
            stale.remove();
        }

        // Keep the input off-screen instead of display:none (some browsers block clicks on display:none)
        let Some(input) = document
            .create_element("input")
            .ok()
            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
        else {
            return;
        };

        input.set_id(INPUT_ID);
        input.set_type("file");
        let accept: Vec<String> = ACCEPTED_EXTENSIONS.iter().map(|ext| format!(".{ext}")).collect();
        input.set_accept(&format!("{SVG_MIME},image/png,image/jpeg,{}", accept.join(",")));
        let _ = input.set_attribute(
            "style",
            "position: fixed; left: -9999px; width: 1px; height: 1px; opacity: 0;",
        );

        // Append to body so click is allowed
        if let Some(body) = document.body() {
            let _ = body.append_child(&input);
        }

        let onchange = Closure::wrap(Box::new(move |ev: web_sys::Event| {
            let Some(input) = ev.target().and_then(|t| t.dyn_into::<HtmlInputElement>().ok()) else {
                return;
            };
            let file = input.files().and_then(|files| files.get(0));
            // The File handle stays valid after its input leaves the DOM.
            input.remove();
            let Some(file) = file else {
                return;
            };
            let reader = match FileReader::new() {
                Ok(reader) => reader,
                Err(e) => {
                    log::error!("file_picker: cannot create FileReader: {e:?}");
                    return;
                }
            };
            let reader2 = reader.clone();
            let name = file.name();
            let mime = file.type_();
            let onload = Closure::once(Box::new(move |_e: JsValue| {
                let result = match reader2.result() {
                    Ok(result) => result,
                    Err(e) => {
                        log::error!("file_picker: reading '{name}' failed: {e:?}");
                        return;
                    }
                };
                let bytes = Uint8Array::new(&result).to_vec();
                set_pending(SelectedFile::new(name, mime, bytes));
            }) as Box<dyn FnOnce(_)>);
            reader.set_onload(Some(onload.as_ref().unchecked_ref()));
            onload.forget();
            if let Err(e) = reader.read_as_array_buffer(&file) {
                log::error!("file_picker: read_as_array_buffer failed: {e:?}");
            }
        }) as Box<dyn FnMut(_)>);

        input.set_onchange(Some(onchange.as_ref().unchecked_ref()));
        onchange.forget(); // keep alive

        // Trigger the native file dialog
        input.click();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_selection_wins() {
        set_pending(SelectedFile::new("first.png", "image/png", vec![1]));
        set_pending(SelectedFile::new("second.png", "image/png", vec![2]));

        let taken = take_selected_template().unwrap();
        assert_eq!(taken.name, "second.png");
        assert_eq!(take_selected_template(), None);
    }
}
