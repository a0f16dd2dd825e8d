use std::collections::BTreeMap;

use core_types::UiLanguage;

/// Menu strings in the configured language. Missing entries fall back to the
/// other language, then to the key itself.
#[derive(Debug, Clone)]
pub struct I18n {
    primary: BTreeMap<&'static str, &'static str>,
    fallback: BTreeMap<&'static str, &'static str>,
}

impl I18n {
    pub fn new(lang: UiLanguage) -> Self {
        let (primary, fallback) = match lang {
            UiLanguage::ZhCn => (zh_cn_map(), en_us_map()),
            UiLanguage::EnUs => (en_us_map(), zh_cn_map()),
        };
        Self { primary, fallback }
    }

    pub fn t<'a>(&'a self, key: &'a str) -> &'a str {
        self.primary
            .get(key)
            .or_else(|| self.fallback.get(key))
            .copied()
            .unwrap_or(key)
    }
}

fn zh_cn_map() -> BTreeMap<&'static str, &'static str> {
    BTreeMap::from([
        ("app.welcome", "欢迎使用 Notekeeper 笔记！"),
        ("app.goodbye", "感谢使用 Notekeeper，再见！"),
        ("menu.title", "主菜单："),
        ("menu.list", "查看全部笔记"),
        ("menu.create", "新建笔记"),
        ("menu.search", "搜索笔记"),
        ("menu.filter", "快速筛选（标题、内容、标签）"),
        ("menu.open", "打开笔记"),
        ("menu.archived", "查看已归档笔记"),
        ("menu.tags", "查看标签"),
        ("menu.exit", "退出"),
        ("menu.prompt", "请输入选项 (1-8)："),
        ("menu.invalid", "无效选项，请输入 1 到 8 之间的数字。"),
        ("list.title", "全部笔记："),
        ("list.empty", "暂无笔记。"),
        ("list.truncated", "更多笔记未显示，请使用搜索缩小范围。"),
        ("note.tags", "标签"),
        ("note.none", "无"),
        ("note.created", "创建于"),
        ("note.updated", "更新于"),
        ("note.preview", "内容预览"),
        ("note.chars", "字"),
        ("note.pinned", "置顶"),
        ("note.archived", "已归档"),
        ("create.title", "新建笔记："),
        ("create.prompt_title", "请输入标题："),
        ("create.empty_title", "标题不能为空！"),
        ("create.prompt_content", "请输入内容（连续按两次回车结束）："),
        ("create.prompt_tags", "请输入标签（逗号分隔）："),
        ("create.done", "笔记已创建"),
        ("search.title", "搜索笔记："),
        ("search.prompt_query", "请输入搜索关键词（回车跳过）："),
        ("search.prompt_tags", "请输入筛选标签（逗号分隔，回车跳过）："),
        ("search.results", "搜索结果"),
        ("search.empty", "没有符合条件的笔记。"),
        ("filter.prompt", "筛选文本："),
        ("open.prompt", "请输入笔记编号："),
        ("open.invalid", "没有该编号的笔记。"),
        (
            "open.actions",
            "1. 编辑  2. 切换置顶  3. 切换归档  4. 删除  5. 返回",
        ),
        ("open.choice", "请选择操作："),
        ("edit.prompt_title", "新标题（回车保持不变）："),
        ("edit.replace_content", "是否替换内容？(y/N)："),
        ("edit.prompt_tags", "新标签（逗号分隔，回车保持不变，输入 - 清空）："),
        ("edit.unchanged", "没有任何修改。"),
        ("edit.done", "笔记已更新。"),
        ("pin.on", "笔记已置顶。"),
        ("pin.off", "已取消置顶。"),
        ("archive.on", "笔记已归档。"),
        ("archive.off", "笔记已从归档中恢复。"),
        ("delete.confirm", "确定删除这条笔记吗？(y/N)："),
        ("delete.done", "笔记已删除。"),
        ("delete.cancelled", "已取消删除。"),
        ("error.not_found", "找不到该笔记！"),
        ("error.persist", "保存笔记失败"),
        ("tags.title", "全部标签："),
        ("tags.empty", "暂无标签。"),
        ("archived.title", "已归档笔记："),
    ])
}

fn en_us_map() -> BTreeMap<&'static str, &'static str> {
    BTreeMap::from([
        ("app.welcome", "Welcome to Notekeeper!"),
        ("app.goodbye", "Thank you for using Notekeeper!"),
        ("menu.title", "Main Menu:"),
        ("menu.list", "View all notes"),
        ("menu.create", "Create new note"),
        ("menu.search", "Search notes"),
        ("menu.filter", "Quick filter (title, content, tags)"),
        ("menu.open", "Open a note"),
        ("menu.archived", "View archived notes"),
        ("menu.tags", "View tags"),
        ("menu.exit", "Exit"),
        ("menu.prompt", "Enter your choice (1-8): "),
        (
            "menu.invalid",
            "Invalid choice. Please enter a number between 1-8.",
        ),
        ("list.title", "All Notes:"),
        ("list.empty", "No notes found."),
        (
            "list.truncated",
            "More notes not shown; narrow the list with search.",
        ),
        ("note.tags", "Tags"),
        ("note.none", "None"),
        ("note.created", "Created"),
        ("note.updated", "Updated"),
        ("note.preview", "Content preview"),
        ("note.chars", "chars"),
        ("note.pinned", "PINNED"),
        ("note.archived", "ARCHIVED"),
        ("create.title", "Create New Note:"),
        ("create.prompt_title", "Enter title: "),
        ("create.empty_title", "Title cannot be empty!"),
        (
            "create.prompt_content",
            "Enter content (press Enter twice to finish):",
        ),
        ("create.prompt_tags", "Enter tags (comma-separated): "),
        ("create.done", "Note created"),
        ("search.title", "Search Notes:"),
        (
            "search.prompt_query",
            "Enter search query (or press Enter to skip): ",
        ),
        (
            "search.prompt_tags",
            "Enter tags to filter (comma-separated, or press Enter to skip): ",
        ),
        ("search.results", "Search Results"),
        ("search.empty", "No notes found matching your criteria."),
        ("filter.prompt", "Filter text: "),
        ("open.prompt", "Enter note number: "),
        ("open.invalid", "No note with that number."),
        (
            "open.actions",
            "1. Edit  2. Toggle pin  3. Toggle archive  4. Delete  5. Back",
        ),
        ("open.choice", "Choose an action: "),
        ("edit.prompt_title", "New title (Enter to keep): "),
        ("edit.replace_content", "Replace content? (y/N): "),
        (
            "edit.prompt_tags",
            "New tags (comma-separated, Enter to keep, - to clear): ",
        ),
        ("edit.unchanged", "Nothing changed."),
        ("edit.done", "Note updated."),
        ("pin.on", "Note pinned."),
        ("pin.off", "Note unpinned."),
        ("archive.on", "Note archived."),
        ("archive.off", "Note restored from archive."),
        ("delete.confirm", "Delete this note? (y/N): "),
        ("delete.done", "Note deleted."),
        ("delete.cancelled", "Delete cancelled."),
        ("error.not_found", "Note not found!"),
        ("error.persist", "Could not save notes"),
        ("tags.title", "All Tags:"),
        ("tags.empty", "No tags available."),
        ("archived.title", "Archived Notes:"),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_chinese_translation() {
        let i18n = I18n::new(UiLanguage::ZhCn);
        assert_eq!(i18n.t("menu.tags"), "查看标签");
    }

    #[test]
    fn falls_back_to_key_when_missing() {
        let i18n = I18n::new(UiLanguage::EnUs);
        assert_eq!(i18n.t("not.exists"), "not.exists");
    }

    #[test]
    fn both_tables_cover_the_same_keys() {
        let en: Vec<_> = en_us_map().into_keys().collect();
        let zh: Vec<_> = zh_cn_map().into_keys().collect();
        assert_eq!(en, zh);
    }

    #[test]
    fn every_key_resolves_in_both_languages() {
        let en = I18n::new(UiLanguage::EnUs);
        let zh = I18n::new(UiLanguage::ZhCn);
        for key in en_us_map().into_keys() {
            assert_ne!(en.t(key), key);
            assert_ne!(zh.t(key), key);
        }
        assert_eq!(en.t("menu.exit"), "Exit");
        assert_eq!(zh.t("menu.exit"), "退出");
    }
}
