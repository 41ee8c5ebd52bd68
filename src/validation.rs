//! 表单校验，全部在调用后端之前完成。

use crate::backend::{GroupForm, RoomForm, UserForm};
use crate::error::{AppError, ValidationErrors};
use crate::models::AccessLevel;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit,
}

fn require(errors: &mut ValidationErrors, field: &str, value: &str, message: &str) {
    if value.trim().is_empty() {
        errors.push(field, message);
    }
}

/// 与前端一致的宽松格式：`本地部分@域名.后缀`，不允许空白字符
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

pub fn validate_user(form: &UserForm, mode: FormMode) -> Result<(), AppError> {
    let mut errors = ValidationErrors::default();

    require(&mut errors, "username", &form.username, "请输入用户名");
    if mode == FormMode::Create {
        require(
            &mut errors,
            "password",
            form.password.as_deref().unwrap_or_default(),
            "请输入密码",
        );
    }
    require(&mut errors, "first_name", &form.first_name, "请输入名");
    require(&mut errors, "last_name", &form.last_name, "请输入姓");
    if form.email.trim().is_empty() {
        errors.push("email", "请输入邮箱地址");
    } else if !is_valid_email(form.email.trim()) {
        errors.push("email", "请输入有效的邮箱地址");
    }

    errors.into_result()
}

pub fn validate_room(form: &RoomForm) -> Result<(), AppError> {
    let mut errors = ValidationErrors::default();

    require(&mut errors, "name", &form.name, "请输入房间名称");
    require(&mut errors, "building", &form.building, "请输入所在楼宇");
    require(&mut errors, "room_number", &form.room_number, "请输入房间号");
    if form.access_level == AccessLevel::Admin {
        errors.push("access_level", "房间访问级别只能是 public 或 restricted");
    }

    errors.into_result()
}

/// 群组的访问级别固定为 restricted，不论表单传了什么
pub fn normalize_group(mut form: GroupForm) -> Result<GroupForm, AppError> {
    let mut errors = ValidationErrors::default();
    require(&mut errors, "name", &form.name, "请输入群组名称");
    errors.into_result()?;

    form.access_level = AccessLevel::Restricted;
    Ok(form)
}
