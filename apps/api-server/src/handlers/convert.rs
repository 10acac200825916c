//! Domain to wire conversions.

use quill_core::domain::{Author, CommentView, PostDetails, PostSummary, Tag, User};
use quill_core::services::{Session, UploadTicket};
use quill_shared::dto::{
    AuthResponse, AuthorResponse, CommentResponse, PostResponse, PostSummaryResponse,
    TagResponse, UploadUrlResponse, UserResponse,
};

pub fn user(user: User) -> UserResponse {
    UserResponse {
        id: user.id,
        name: user.name,
        email: user.email,
        bio: user.bio,
        avatar: user.avatar,
        created_at: user.created_at,
    }
}

pub fn session(session: Session) -> AuthResponse {
    AuthResponse {
        access_token: session.access_token,
        token_type: "Bearer".to_string(),
        expires_in: session.expires_in,
        user: user(session.user),
    }
}

fn author(author: Author) -> AuthorResponse {
    AuthorResponse {
        id: author.id,
        name: author.name,
        avatar: author.avatar,
    }
}

fn tag(tag: Tag) -> TagResponse {
    TagResponse {
        id: tag.id,
        name: tag.name,
    }
}

pub fn post(details: PostDetails) -> PostResponse {
    let PostDetails {
        post,
        author: post_author,
        tags,
        comment_count,
        like_count,
    } = details;

    PostResponse {
        id: post.id,
        title: post.title,
        slug: post.slug,
        content: post.content,
        thumbnail: post.thumbnail,
        published: post.published,
        created_at: post.created_at,
        updated_at: post.updated_at,
        author: author(post_author),
        tags: tags.into_iter().map(tag).collect(),
        comment_count,
        like_count,
    }
}

pub fn post_summary(summary: PostSummary) -> PostSummaryResponse {
    PostSummaryResponse {
        id: summary.id,
        title: summary.title,
        slug: summary.slug,
        content: summary.content,
        thumbnail: summary.thumbnail,
        published: summary.published,
        created_at: summary.created_at,
        comment_count: summary.comment_count,
        like_count: summary.like_count,
    }
}

pub fn comment(view: CommentView) -> CommentResponse {
    CommentResponse {
        id: view.comment.id,
        post_id: view.comment.post_id,
        content: view.comment.content,
        created_at: view.comment.created_at,
        author: author(view.author),
    }
}

pub fn upload(ticket: UploadTicket) -> UploadUrlResponse {
    UploadUrlResponse {
        upload_url: ticket.upload_url,
        key: ticket.key,
        public_url: ticket.public_url,
        expires_in: ticket.expires_in,
    }
}
