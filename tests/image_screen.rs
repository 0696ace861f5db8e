//! Image screen: attachments, prompt template and streamed answers.

mod common;

use futures_util::{FutureExt, StreamExt};

use common::{Script, ScriptedService, JPEG_MAGIC, PNG_MAGIC};
use promptdeck::attachment::ImageAttachment;
use promptdeck::screen::{
    create_screen, ImageScreen, Prompt, PromptScreen, RequestState, ScreenError, ScreenKind,
    ScreenSettings, ScreenView,
};

fn png(name: &str) -> ImageAttachment {
    ImageAttachment::from_bytes(name, PNG_MAGIC.to_vec()).unwrap()
}

fn jpeg(name: &str) -> ImageAttachment {
    ImageAttachment::from_bytes(name, JPEG_MAGIC.to_vec()).unwrap()
}

#[tokio::test]
async fn sends_attachments_in_order_with_templated_prompt() {
    let service = ScriptedService::new(vec![Script::chunks(&["A cat."])]);
    let screen = create_screen(ScreenKind::Image, service.clone(), &ScreenSettings::default());

    screen.attach(png("first.png")).unwrap();
    screen.attach(jpeg("second.jpg")).unwrap();
    screen
        .submit(Prompt::new("What animal is this?").unwrap())
        .await
        .unwrap();

    let request = &service.requests()[0];
    assert_eq!(
        request.prompt,
        "Look at the image(s), and then answer the following question: What animal is this?"
    );
    let names: Vec<&str> = request.images.iter().map(|i| i.name()).collect();
    assert_eq!(names, vec!["first.png", "second.jpg"]);
    assert_eq!(screen.view(), ScreenView::Request(RequestState::success("A cat.")));
}

#[tokio::test]
async fn observers_see_every_streamed_prefix() {
    let service = ScriptedService::new(vec![Script::chunks(&["It is ", "a ", "dog."])]);
    let screen = create_screen(ScreenKind::Image, service, &ScreenSettings::default());
    screen.attach(png("dog.png")).unwrap();

    let mut views = screen.subscribe();
    screen.submit(Prompt::new("What is it?").unwrap()).await.unwrap();

    let mut seen = Vec::new();
    while let Some(Some(ScreenView::Request(state))) = views.next().now_or_never() {
        seen.push(state);
    }
    assert_eq!(
        seen,
        vec![
            RequestState::Pending,
            RequestState::success("It is "),
            RequestState::success("It is a "),
            RequestState::success("It is a dog."),
        ]
    );
}

#[tokio::test]
async fn custom_template_is_applied() {
    let service = ScriptedService::new(vec![Script::chunks(&["ok"])]);
    let settings = ScreenSettings {
        image_prompt_template: "Q: {input} (answer briefly)".to_string(),
        ..ScreenSettings::default()
    };
    let screen = create_screen(ScreenKind::Image, service.clone(), &settings);

    screen.submit(Prompt::new("Colour?").unwrap()).await.unwrap();

    assert_eq!(service.requests()[0].prompt, "Q: Colour? (answer briefly)");
}

#[tokio::test]
async fn attachments_persist_across_submits() {
    let service = ScriptedService::new(vec![Script::chunks(&["one"]), Script::chunks(&["two"])]);
    let screen = ImageScreen::new(service.clone(), "{input}", 64);
    screen.attach(png("kept.png")).unwrap();

    screen.submit(Prompt::new("first").unwrap()).await.unwrap();
    screen.submit(Prompt::new("second").unwrap()).await.unwrap();

    let requests = service.requests();
    assert_eq!(requests[0].images.len(), 1);
    assert_eq!(requests[1].images.len(), 1);
    assert_eq!(screen.attachments().len(), 1);
}

#[tokio::test]
async fn submit_without_images_still_streams() {
    let service = ScriptedService::new(vec![Script::chunks(&["nothing attached"])]);
    let screen = ImageScreen::new(service.clone(), "{input}", 64);

    screen.submit(Prompt::new("hello").unwrap()).await.unwrap();

    assert!(service.requests()[0].images.is_empty());
    assert_eq!(screen.state(), RequestState::success("nothing attached"));
}

#[tokio::test]
async fn text_screen_rejects_attachments() {
    let screen = create_screen(
        ScreenKind::Text,
        ScriptedService::new(vec![]),
        &ScreenSettings::default(),
    );

    assert!(matches!(
        screen.attach(png("a.png")),
        Err(ScreenError::AttachmentsUnsupported {
            kind: ScreenKind::Text
        })
    ));
}

#[tokio::test]
async fn factory_builds_each_kind() {
    for kind in ScreenKind::all() {
        let screen = create_screen(kind, ScriptedService::new(vec![]), &ScreenSettings::default());
        assert_eq!(screen.kind(), kind);
    }
}
