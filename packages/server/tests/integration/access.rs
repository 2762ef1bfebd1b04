//! Cross-cutting access rules: which routes need a token and who may touch what.

use serde_json::json;

use crate::common::{TestApp, blog_form, routes};

#[tokio::test]
async fn public_reads_need_no_token() {
    let app = TestApp::spawn().await;
    let ada = app.create_user("Ada", "Lovelace").await;
    let blog_id = app.create_blog(&ada, "Engines").await;
    let comment_id = app.create_comment(&ada, blog_id, "hi").await;

    for path in [
        routes::BLOGS.to_string(),
        routes::blog(blog_id),
        routes::blogs_by_user(ada.id),
        format!("{}?query=eng", routes::BLOG_SEARCH),
        routes::COMMENTS.to_string(),
        routes::comment(comment_id),
        routes::comments_by_blog(blog_id),
        routes::comments_by_user(ada.id),
    ] {
        let res = app.get_without_token(&path).await;
        assert_eq!(res.status, 200, "GET {path}: {}", res.text);
    }
}

#[tokio::test]
async fn user_routes_need_a_token() {
    let app = TestApp::spawn().await;
    let ada = app.create_user("Ada", "Lovelace").await;

    for path in [
        routes::USERS.to_string(),
        routes::USERS_ALL.to_string(),
        routes::user(ada.id),
    ] {
        let res = app.get_without_token(&path).await;
        assert_eq!(res.status, 401, "GET {path}");
        assert_eq!(res.body["code"], "TOKEN_MISSING");
    }

    let res = app.delete_without_token(&routes::user(ada.id)).await;
    assert_eq!(res.status, 401);
}

#[tokio::test]
async fn mutations_need_a_token() {
    let app = TestApp::spawn().await;
    let ada = app.create_user("Ada", "Lovelace").await;
    let blog_id = app.create_blog(&ada, "Engines").await;
    let comment_id = app.create_comment(&ada, blog_id, "hi").await;

    let res = app.delete_without_token(&routes::blog(blog_id)).await;
    assert_eq!(res.status, 401);
    let res = app.delete_without_token(&routes::comment(comment_id)).await;
    assert_eq!(res.status, 401);
    let res = app.delete_without_token(&routes::user_delete_image(ada.id)).await;
    assert_eq!(res.status, 401);

    let res = app
        .client
        .put(app.url(&routes::comment(comment_id)))
        .json(&json!({"blogId": blog_id, "userId": ada.id, "content": "x"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 401);
}

#[tokio::test]
async fn admin_may_act_on_any_owned_resource() {
    let app = TestApp::spawn().await;
    let admin = app.admin().await;
    let ada = app.create_user("Ada", "Lovelace").await;

    let blog = app
        .post_multipart(routes::BLOGS, blog_form("By proxy", "Body", ada.id), &admin.token)
        .await;
    assert_eq!(blog.status, 201, "{}", blog.text);
    let blog_id = blog.id();

    let comment = app
        .post_with_token(
            routes::COMMENTS,
            &json!({"blogId": blog_id, "userId": ada.id, "content": "proxy"}),
            &admin.token,
        )
        .await;
    assert_eq!(comment.status, 201, "{}", comment.text);

    let res = app
        .put_with_token(
            &routes::user(ada.id),
            &json!({"firstName": "Augusta", "lastName": "King", "email": ada.email}),
            &admin.token,
        )
        .await;
    assert_eq!(res.status, 200);

    let res = app.delete_with_token(&routes::user(ada.id), &admin.token).await;
    assert_eq!(res.status, 204);
}

#[tokio::test]
async fn token_of_deleted_user_still_carries_its_claims() {
    // Tokens are stateless: deleting the account does not revoke them, but
    // ownership checks then point at a record that no longer exists.
    let app = TestApp::spawn().await;
    let ada = app.create_user("Ada", "Lovelace").await;

    let res = app.delete_with_token(&routes::user(ada.id), &ada.token).await;
    assert_eq!(res.status, 204);

    let me = app.get_with_token(routes::ME, &ada.token).await;
    assert_eq!(me.status, 200);

    let res = app.get_with_token(&routes::user(ada.id), &ada.token).await;
    assert_eq!(res.status, 404);
}
