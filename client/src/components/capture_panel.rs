//! Capture step: camera and upload sub-tabs, preview and analyze button.
//!
//! ARCHITECTURE
//! ============
//! This component owns the camera stream. An effect keyed on
//! `Workflow::wants_camera` opens the stream when the camera sub-tab is
//! active in `Acquiring` and drops it otherwise, so every path out of the
//! camera state (sub-tab switch, capture, reset, unmount, page unload)
//! releases the device. Acquired images are handed to the workflow; the
//! analyze button only calls back into the page.

use leptos::prelude::*;

use workflow::{ImageSource, Workflow};

#[cfg(feature = "csr")]
use std::cell::RefCell;
#[cfg(feature = "csr")]
use std::rc::Rc;

#[cfg(feature = "csr")]
use workflow::machine::CameraStatus;
#[cfg(feature = "csr")]
use workflow::{AcquireError, CapturedImage};

#[cfg(feature = "csr")]
use crate::media::camera::{CameraStream, ReleaseOnUnload, play};
#[cfg(feature = "csr")]
use crate::media::canvas::{capture_frame, ingest_file};

/// Hand an acquired image to the workflow, logging late arrivals.
#[cfg(feature = "csr")]
fn store_image(workflow: RwSignal<Workflow>, result: Result<CapturedImage, AcquireError>) {
    match result {
        Ok(image) => {
            leptos::logging::log!(
                "image acquired: {}x{} ({} KB, {:?})",
                image.width,
                image.height,
                image.encoded_kb(),
                image.source
            );
            if let Some(Err(e)) = workflow.try_update(|wf| wf.image_acquired(image)) {
                leptos::logging::warn!("discarding acquired image: {e}");
            }
        }
        Err(e) => {
            leptos::logging::warn!("image acquisition failed: {e}");
            workflow.update(|wf| wf.acquisition_failed(&e));
        }
    }
}

/// Capture step body.
#[component]
pub fn CapturePanel(on_analyze: Callback<()>) -> impl IntoView {
    let workflow = expect_context::<RwSignal<Workflow>>();
    let view_state = Memo::new(move |_| workflow.with(Workflow::view));
    let input = move || workflow.with(|wf| wf.input);
    let preview_url = move || workflow.with(|wf| wf.image().map(|img| img.data_url.clone()));

    let video_ref = NodeRef::<leptos::html::Video>::new();
    let file_ref = NodeRef::<leptos::html::Input>::new();

    #[cfg(feature = "csr")]
    {
        let camera: Rc<RefCell<Option<CameraStream>>> = Rc::new(RefCell::new(None));
        let unload = ReleaseOnUnload::install(Rc::clone(&camera));
        let wants_camera = Memo::new(move |_| workflow.with(Workflow::wants_camera));
        let opening = RwSignal::new(false);

        Effect::new(move || {
            let _unload = &unload;
            if !wants_camera.get() {
                if camera.borrow_mut().take().is_some() {
                    workflow.update(|wf| wf.camera_changed(CameraStatus::Off));
                }
                return;
            }
            if camera.borrow().is_some() || opening.get_untracked() {
                return;
            }

            opening.set(true);
            workflow.update(|wf| wf.camera_changed(CameraStatus::Starting));
            let camera = Rc::clone(&camera);
            leptos::task::spawn_local(async move {
                let opened = CameraStream::open().await;
                opening.set(false);
                let stream = match opened {
                    Ok(stream) => stream,
                    Err(e) => {
                        leptos::logging::warn!("camera unavailable: {e}");
                        workflow.update(|wf| wf.acquisition_failed(&e));
                        return;
                    }
                };
                if !workflow.with_untracked(Workflow::wants_camera) {
                    drop(stream);
                    workflow.update(|wf| wf.camera_changed(CameraStatus::Off));
                    return;
                }
                let status = match video_ref.get_untracked() {
                    Some(video) => stream.attach(&video).await,
                    None => CameraStatus::Failed("camera preview is not mounted".to_owned()),
                };
                *camera.borrow_mut() = Some(stream);
                workflow.update(|wf| wf.camera_changed(status));
            });
        });
    }

    let on_capture = move |_| {
        #[cfg(feature = "csr")]
        {
            let Some(video) = video_ref.get() else {
                return;
            };
            store_image(workflow, capture_frame(&video));
        }
    };

    let on_enable_camera = move |_| {
        #[cfg(feature = "csr")]
        {
            let Some(video) = video_ref.get() else {
                return;
            };
            leptos::task::spawn_local(async move {
                let status = play(&video).await;
                workflow.update(|wf| wf.camera_changed(status));
            });
        }
    };

    let on_file_change = move |_| {
        #[cfg(feature = "csr")]
        {
            let Some(input) = file_ref.get() else {
                return;
            };
            let Some(file) = input.files().and_then(|files| files.get(0)) else {
                return;
            };
            input.set_value("");
            leptos::task::spawn_local(async move {
                store_image(workflow, ingest_file(&file).await);
            });
        }
    };

    let on_retake = move |_| {
        if let Some(Err(e)) = workflow.try_update(Workflow::retake) {
            leptos::logging::warn!("retake ignored: {e}");
        }
    };
    let on_resume = move |_| {
        if let Some(Err(e)) = workflow.try_update(Workflow::resume_captured) {
            leptos::logging::warn!("resume ignored: {e}");
        }
    };

    view! {
        <section class="capture-panel">
            <h2 class="capture-panel__title">{move || view_state.get().capture_title}</h2>
            <p class="capture-panel__instruction">{move || view_state.get().instruction}</p>

            <div class="capture-panel__tabs" role="tablist">
                <button
                    class="capture-panel__tab"
                    class:capture-panel__tab--active=move || input() == ImageSource::Camera
                    role="tab"
                    on:click=move |_| workflow.update(|wf| wf.select_input(ImageSource::Camera))
                >
                    "Camera"
                </button>
                <button
                    class="capture-panel__tab"
                    class:capture-panel__tab--active=move || input() == ImageSource::Upload
                    role="tab"
                    on:click=move |_| workflow.update(|wf| wf.select_input(ImageSource::Upload))
                >
                    "Upload"
                </button>
            </div>

            <div class="capture-panel__camera" class:hidden=move || !view_state.get().show_camera>
                <video class="capture-panel__video" node_ref=video_ref autoplay=true playsinline=true prop:muted=true></video>
                <Show when=move || view_state.get().camera_error.is_some()>
                    <div class="capture-panel__camera-error">"Camera unavailable. You can still use the Upload tab."</div>
                </Show>
                <Show when=move || view_state.get().show_enable_camera>
                    <button class="btn btn--secondary" on:click=on_enable_camera>
                        "Enable camera"
                    </button>
                </Show>
                <button
                    class="btn btn--primary capture-panel__capture"
                    prop:disabled=move || !view_state.get().capture_enabled
                    on:click=on_capture
                >
                    "Capture"
                </button>
            </div>

            <div class="capture-panel__upload" class:hidden=move || !view_state.get().show_upload>
                <label class="capture-panel__file-label">
                    "Choose an image (JPG, PNG, or GIF, under 10MB)"
                    <input type="file" accept="image/*" node_ref=file_ref on:change=on_file_change/>
                </label>
            </div>

            <Show when=move || view_state.get().show_resume>
                <button class="btn btn--link capture-panel__resume" on:click=on_resume>
                    "Use previous image"
                </button>
            </Show>

            <Show when=move || view_state.get().show_capture_result>
                <div class="capture-panel__result">
                    <div class="capture-panel__result-label">{move || view_state.get().result_label}</div>
                    {move || {
                        preview_url()
                            .map(|src| view! { <img class="capture-panel__preview" src=src alt="Captured work"/> })
                    }}
                    <button class="btn btn--secondary" on:click=on_retake>
                        {move || view_state.get().retake_label}
                    </button>
                </div>
            </Show>

            {move || view_state.get().inline_error.map(|message| view! { <div class="capture-panel__error">{message}</div> })}

            <button
                class="btn btn--primary capture-panel__analyze"
                prop:disabled=move || !view_state.get().analyze_enabled
                on:click=move |_| on_analyze.run(())
            >
                {move || view_state.get().analyze_label}
            </button>
        </section>
    }
}
